// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 规范化URL用于前沿去重
///
/// 去除fragment和query，使同一内容页面的不同入口归一为一个候选
pub fn normalize_for_frontier(url: &Url) -> Url {
    let mut clean = url.clone();
    clean.set_fragment(None);
    clean.set_query(None);
    clean
}

/// 判断两个URL是否同源（scheme + host + port）
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}
