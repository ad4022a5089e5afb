// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod captcha_detector;
pub mod proxy_pool;
pub mod reqwest_engine;
pub mod resilience;
pub mod traits;
pub mod user_agents;
