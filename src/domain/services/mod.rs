// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含系统的核心业务逻辑服务接口：
/// - 草稿服务（draft_service）：关键词发现、内容规划和草稿生成的
///   LLM黑盒协作方接口及其OpenAI兼容实现
/// - Webhook投递（webhook_delivery）：签名幂等的发布投递接口
pub mod draft_service;
pub mod webhook_delivery;
