// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::article::PortableArticle;
use crate::domain::models::crawl::CrawlPageResult;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::env;

/// 草稿引擎特质
///
/// 关键词发现、内容规划和草稿生成的LLM黑盒协作方接口。
/// 提示词工程属于实现细节，不在领域层约束范围内。
#[async_trait]
pub trait DraftEngine: Send + Sync {
    /// 基于爬取结果发现候选关键词
    async fn discover_keywords(&self, pages: &[CrawlPageResult]) -> Result<Vec<String>>;
    /// 为单个关键词生成文章草稿
    async fn generate_article(&self, keyword: &str) -> Result<PortableArticle>;
}

/// LLM草稿引擎 - 处理与LLM提供商的交互
///
/// # 配置
///
/// 通过环境变量进行配置：
/// - `LLM_API_KEY` - LLM API密钥
/// - `LLM_MODEL` - 使用的模型名称（默认为 gpt-3.5-turbo）
/// - `LLM_API_BASE_URL` - LLM API基础URL
pub struct LlmDraftEngine {
    api_key: Option<String>,
    model: String,
    api_base_url: String,
    client: reqwest::Client,
}

impl Default for LlmDraftEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmDraftEngine {
    pub fn new() -> Self {
        Self {
            api_key: env::var("LLM_API_KEY").ok(),
            model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            api_base_url: env::var("LLM_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            client: reqwest::Client::new(),
        }
    }

    pub fn new_with_config(api_key: String, model: String, api_base_url: String) -> Self {
        Self {
            api_key: Some(api_key),
            model,
            api_base_url,
            client: reqwest::Client::new(),
        }
    }

    /// 调用chat/completions并解析出JSON内容
    async fn complete_json(&self, system: &str, prompt: &str) -> Result<Value> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("LLM API key not configured"))?;

        let request_body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt }
            ],
            "temperature": 0.2
        });

        let url = format!("{}/chat/completions", self.api_base_url);
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request_body)
            .send()
            .await
            .context("Failed to send request to LLM API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "LLM API returned error: {} - {}",
                status,
                error_text
            ));
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse LLM API response")?;

        if let Some(content) = body["choices"][0]["message"]["content"].as_str() {
            // Clean up potential markdown code blocks
            let clean_content = content
                .trim()
                .trim_start_matches("```json")
                .trim_start_matches("```")
                .trim_end_matches("```");

            serde_json::from_str::<Value>(clean_content)
                .context("Failed to parse generated JSON content")
        } else {
            Err(anyhow::anyhow!("Invalid response format from LLM API"))
        }
    }
}

#[async_trait]
impl DraftEngine for LlmDraftEngine {
    async fn discover_keywords(&self, pages: &[CrawlPageResult]) -> Result<Vec<String>> {
        // Condense crawl output to titles and headings to stay within token limits
        let mut summary = String::new();
        for page in pages.iter().take(50) {
            if let Some(title) = &page.title {
                summary.push_str(title);
                summary.push('\n');
            }
            for heading in &page.headings {
                summary.push_str(&heading.content);
                summary.push('\n');
            }
        }

        let prompt = format!(
            "Based on the following site content outline, propose SEO keywords this site \
            should target. Return a JSON array of keyword strings, nothing else.\n{}",
            summary
        );

        let value = self
            .complete_json("You are an SEO strategist. You output only valid JSON.", &prompt)
            .await?;

        let keywords: Vec<String> = serde_json::from_value(value)
            .context("Keyword discovery did not return a string array")?;
        Ok(keywords)
    }

    async fn generate_article(&self, keyword: &str) -> Result<PortableArticle> {
        let prompt = format!(
            "Write an SEO article targeting the keyword \"{}\". Return a JSON object with \
            fields: title, slug, body_html, description, keywords (array of strings).",
            keyword
        );

        let value = self
            .complete_json("You are an SEO content writer. You output only valid JSON.", &prompt)
            .await?;

        let article: PortableArticle =
            serde_json::from_value(value).context("Generated article has unexpected shape")?;
        Ok(article)
    }
}
