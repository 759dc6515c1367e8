//! 微博文本解析工具

use anyhow::Result;
use regex::Regex;

/// 解析微博计数文本
///
/// 支持 "386"、"赞 386"、"1.2万"、"3亿"、空串/纯文字（记 0）
pub fn parse_count(text: &str) -> u64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0;
    }

    // 提取第一段数字（可能带小数点）
    let mut number = String::new();
    let mut seen_digit = false;
    let mut rest_start = trimmed.len();
    for (i, c) in trimmed.char_indices() {
        if c.is_ascii_digit() || (c == '.' && seen_digit && !number.contains('.')) {
            seen_digit = true;
            number.push(c);
        } else if seen_digit {
            rest_start = i;
            break;
        }
    }

    if !seen_digit {
        return 0;
    }

    let value: f64 = match number.parse() {
        Ok(v) => v,
        Err(_) => return 0,
    };

    // 数字后紧跟的单位
    let unit = trimmed[rest_start.min(trimmed.len())..].trim_start();
    let multiplier = if unit.starts_with('万') {
        10_000.0
    } else if unit.starts_with('亿') {
        100_000_000.0
    } else {
        1.0
    };

    (value * multiplier) as u64
}

/// 从作者主页 href 中提取用户 ID
///
/// 兼容 /u/1234、/profile/1234、https://weibo.com/u/1234?xxx 等形式；
/// 提取不到返回空串（原始数据就常缺）
pub fn extract_author_id(href: &str) -> Result<String> {
    let re = Regex::new(r"/(?:u|profile)/(\d+)")?;
    if let Some(cap) = re.captures(href) {
        return Ok(cap[1].to_string());
    }

    // 退化形式：href 本身就是一串数字
    let re_digits = Regex::new(r"^(\d{5,})$")?;
    if let Some(cap) = re_digits.captures(href.trim()) {
        return Ok(cap[1].to_string());
    }

    Ok(String::new())
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count_plain_number() {
        assert_eq!(parse_count("386"), 386);
        assert_eq!(parse_count(" 12 "), 12);
    }

    #[test]
    fn test_parse_count_with_prefix_text() {
        assert_eq!(parse_count("赞 386"), 386);
        assert_eq!(parse_count("共3条回复"), 3);
    }

    #[test]
    fn test_parse_count_wan_unit() {
        assert_eq!(parse_count("1.2万"), 12000);
        assert_eq!(parse_count("转发 3万"), 30000);
        assert_eq!(parse_count("2亿"), 200_000_000);
    }

    #[test]
    fn test_parse_count_garbage_is_zero() {
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("赞"), 0);
        assert_eq!(parse_count("..."), 0);
    }

    #[test]
    fn test_extract_author_id_from_href() {
        assert_eq!(extract_author_id("/u/1234567890").unwrap(), "1234567890");
        assert_eq!(
            extract_author_id("https://weibo.com/u/987654?from=feed").unwrap(),
            "987654"
        );
        assert_eq!(extract_author_id("/profile/555555").unwrap(), "555555");
    }

    #[test]
    fn test_extract_author_id_bare_digits() {
        assert_eq!(extract_author_id("1234567890").unwrap(), "1234567890");
    }

    #[test]
    fn test_extract_author_id_missing() {
        assert_eq!(extract_author_id("/hot/feed").unwrap(), "");
        assert_eq!(extract_author_id("").unwrap(), "");
    }

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("这是一条很长的微博", 4), "这是一条...");
        assert_eq!(truncate_text("短", 4), "短");
    }
}
