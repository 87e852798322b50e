//! 基于 scraper 的小型声明式查询层
//!
//! 不同版本的报告生成器使用不同的 class/标签组合，`Query` 按顺序尝试每种形态，
//! 第一个有结果的形态胜出。

use scraper::{ElementRef, Html, Selector};

/// 按顺序尝试的一组 CSS 形态
#[derive(Debug)]
pub struct Query {
    shapes: Vec<Selector>,
}

impl Query {
    /// 编译一组静态选择器；仅用于源码中的字面量
    pub fn new(shapes: &[&str]) -> Self {
        let shapes = shapes
            .iter()
            .map(|s| Selector::parse(s).unwrap_or_else(|e| panic!("invalid selector {s:?}: {e:?}")))
            .collect();
        Self { shapes }
    }

    /// 第一个有匹配的形态下，scope 内的所有匹配元素
    pub fn all_in<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        for shape in &self.shapes {
            let found: Vec<_> = scope.select(shape).collect();
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    /// 文档级别的 all_in
    pub fn all_in_document<'a>(&self, doc: &'a Html) -> Vec<ElementRef<'a>> {
        for shape in &self.shapes {
            let found: Vec<_> = doc.select(shape).collect();
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    /// 第一个匹配元素
    pub fn first_in<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.shapes
            .iter()
            .find_map(|shape| scope.select(shape).next())
    }

    /// 依次尝试每种形态，返回第一个非空的文本（同一形态的多个匹配拼接后 trim）
    pub fn text_in(&self, scope: ElementRef<'_>) -> String {
        for shape in &self.shapes {
            let text: String = scope.select(shape).map(|el| raw_text(el)).collect();
            let text = text.trim();
            if !text.is_empty() {
                return text.to_string();
            }
        }
        String::new()
    }
}

fn raw_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// 元素的全部文本，去掉首尾空白
pub fn text_of(el: ElementRef<'_>) -> String {
    raw_text(el).trim().to_string()
}

pub fn is_tag(el: ElementRef<'_>, name: &str) -> bool {
    el.value().name().eq_ignore_ascii_case(name)
}

pub fn is_heading(el: ElementRef<'_>) -> bool {
    matches!(
        el.value().name().to_ascii_lowercase().as_str(),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
    )
}

pub fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

pub fn parent_element<'a>(el: ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.parent().and_then(ElementRef::wrap)
}

/// 当前元素或最近的带指定 class 的祖先
pub fn closest_with_class<'a>(el: ElementRef<'a>, class: &str) -> Option<ElementRef<'a>> {
    if has_class(el, class) {
        return Some(el);
    }
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| has_class(*a, class))
}

/// 之前的兄弟元素（由近及远），跳过文本节点
pub fn prev_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.prev_siblings().filter_map(ElementRef::wrap)
}

/// 之后的兄弟元素，跳过文本节点
pub fn next_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.next_siblings().filter_map(ElementRef::wrap)
}
