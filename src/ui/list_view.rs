//! 列表视图状态
//!
//! 订阅快照整表替换本地列表；状态过滤只影响可见集合，
//! 不影响持有的数据。

use crate::models::{Order, PriorAuthorization};

/// 状态过滤器
///
/// "all" 匹配一切；具体状态大小写不敏感匹配
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(String),
}

impl StatusFilter {
    /// 解析下拉框的选择值
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("all") {
            StatusFilter::All
        } else {
            StatusFilter::Only(raw.trim().to_string())
        }
    }

    pub fn matches(&self, status: &str) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted.eq_ignore_ascii_case(status),
        }
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        StatusFilter::All
    }
}

/// 有可过滤状态标签的记录
pub trait HasStatus {
    fn status_label(&self) -> &str;
}

impl HasStatus for Order {
    fn status_label(&self) -> &str {
        self.status.as_str()
    }
}

impl HasStatus for PriorAuthorization {
    fn status_label(&self) -> &str {
        self.status.as_str()
    }
}

/// 整表替换的列表视图
#[derive(Debug, Clone)]
pub struct ListView<T> {
    items: Vec<T>,
    filter: StatusFilter,
}

impl<T: HasStatus> ListView<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            filter: StatusFilter::All,
        }
    }

    /// 用订阅快照整表替换本地状态
    pub fn replace(&mut self, snapshot: Vec<T>) {
        self.items = snapshot;
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> &StatusFilter {
        &self.filter
    }

    /// 当前过滤器下可见的记录
    pub fn visible(&self) -> Vec<&T> {
        self.items
            .iter()
            .filter(|item| self.filter.matches(item.status_label()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T: HasStatus> Default for ListView<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake(&'static str);

    impl HasStatus for Fake {
        fn status_label(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_all_filter_returns_everything() {
        let mut view = ListView::new();
        view.replace(vec![Fake("PENDING"), Fake("COMPLETED"), Fake("CANCELLED")]);
        assert_eq!(view.visible().len(), 3);
    }

    #[test]
    fn test_specific_filter_matches_case_insensitively() {
        let mut view = ListView::new();
        view.replace(vec![Fake("PENDING"), Fake("COMPLETED"), Fake("PENDING")]);
        view.set_filter(StatusFilter::parse("pending"));

        let visible = view.visible();
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|f| f.0 == "PENDING"));
    }

    #[test]
    fn test_parse_all_is_case_insensitive() {
        assert_eq!(StatusFilter::parse("All"), StatusFilter::All);
        assert_eq!(StatusFilter::parse("ALL"), StatusFilter::All);
        assert_eq!(
            StatusFilter::parse("submitted"),
            StatusFilter::Only("submitted".to_string())
        );
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut view = ListView::new();
        view.replace(vec![Fake("PENDING")]);
        view.replace(vec![Fake("COMPLETED"), Fake("REJECTED")]);
        // 旧状态被整表覆盖，而不是合并
        assert_eq!(view.len(), 2);
    }
}
