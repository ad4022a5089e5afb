// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

mod support;

mod pipeline_test;
mod proxy_list_test;
mod resilience_test;
