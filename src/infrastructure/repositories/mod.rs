// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 内存实现隐藏在领域仓库特质之后，换成持久化后端时
/// 队列语义不需要任何改动。
pub mod memory_content_repo;
pub mod memory_job_repo;
