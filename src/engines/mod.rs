// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 引擎模块
///
/// 提供页面渲染能力的抽象接口和无头浏览器实现。
/// 前沿逻辑只依赖`PageEngine`特质，测试时注入假引擎即可。
pub mod browser_engine;
pub mod traits;
