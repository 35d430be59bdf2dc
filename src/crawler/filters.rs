// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

// Asset-like paths are never indexable content pages
static ASSET_EXTENSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\.(png|jpe?g|gif|webp|svg|ico|css|js|mjs|json|xml|txt|pdf|zip|gz|tar|mp3|mp4|webm|avi|mov|woff2?|ttf|eot|otf)$",
    )
    .expect("asset extension regex is valid")
});

// Auth/billing/admin/dashboard-style paths carry no indexable content
static EXCLUDED_SEGMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)/(wp-admin|wp-login|admin|login|logout|signin|signup|sign-in|sign-up|register|auth|account|dashboard|billing|checkout|cart|api)(/|$)",
    )
    .expect("excluded segment regex is valid")
});

/// 判断路径是否指向可索引的内容页面
///
/// 共享过滤谓词：排除按扩展名识别的资源文件和
/// 认证/计费/管理后台风格的路径，使前沿专注于内容页面。
pub fn is_indexable_path(url: &Url) -> bool {
    let path = url.path();
    !ASSET_EXTENSION_RE.is_match(path) && !EXCLUDED_SEGMENT_RE.is_match(path)
}
