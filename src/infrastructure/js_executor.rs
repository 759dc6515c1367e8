//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS / 点击 / 输入"的能力

use anyhow::Result;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() / click / fill 能力
/// - 不认识 Comment / Post / Container
/// - 不处理业务流程
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 选择器匹配的元素数量
    pub async fn count(&self, selector: &str) -> Result<usize> {
        let js_code = format!(
            "document.querySelectorAll({}).length",
            serde_json::to_string(selector)?
        );
        self.eval_as(js_code).await
    }

    /// 选择器是否命中至少一个元素
    pub async fn exists(&self, selector: &str) -> Result<bool> {
        Ok(self.count(selector).await? > 0)
    }

    /// 点击选择器命中的第 nth 个元素
    ///
    /// 返回 false 表示元素不存在（视为未消费，不作为错误）
    pub async fn click_nth(&self, selector: &str, nth: usize) -> Result<bool> {
        let js_code = format!(
            r#"
            (() => {{
                const els = document.querySelectorAll({selector});
                const el = els[{nth}];
                if (!el) return false;
                el.scrollIntoView({{ block: 'center' }});
                el.click();
                return true;
            }})()
            "#,
            selector = serde_json::to_string(selector)?,
            nth = nth,
        );
        self.eval_as(js_code).await
    }

    /// 向选择器命中的第 nth 个输入框填入文本
    pub async fn fill_nth(&self, selector: &str, nth: usize, text: &str) -> Result<bool> {
        let js_code = format!(
            r#"
            (() => {{
                const els = document.querySelectorAll({selector});
                const el = els[{nth}];
                if (!el) return false;
                el.focus();
                el.value = {text};
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()
            "#,
            selector = serde_json::to_string(selector)?,
            nth = nth,
            text = serde_json::to_string(text)?,
        );
        self.eval_as(js_code).await
    }

    /// 滚动到页面底部，返回滚动后的 scrollHeight
    pub async fn scroll_to_bottom(&self) -> Result<u64> {
        let js_code = r#"
            (() => {
                window.scrollTo(0, document.body.scrollHeight);
                return document.body.scrollHeight;
            })()
        "#;
        self.eval_as(js_code).await
    }
}
