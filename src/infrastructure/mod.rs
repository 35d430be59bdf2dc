// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施模块
///
/// 提供领域接口的具体实现：内存仓库、HTTP Webhook投递
/// 和Prometheus指标导出
pub mod metrics;
pub mod repositories;
pub mod services;
