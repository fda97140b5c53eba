use crate::events::CaptionFrame;
use crate::mapper::ContentPosition;

/// Per-item caption texts, possibly containing markup.
#[derive(Debug, Clone, Default)]
pub struct Captions {
    texts: Vec<String>,
}

impl Captions {
    pub fn new(texts: Vec<String>) -> Self {
        Self { texts }
    }

    /// True if at least one item has a caption.
    pub fn any(&self) -> bool {
        self.texts.iter().any(|text| !text.is_empty())
    }

    pub fn text(&self, index: usize) -> &str {
        self.texts.get(index).map_or("", String::as_str)
    }

    /// Blend the captions the same way the images are blended.
    pub fn frame(&self, position: &ContentPosition) -> CaptionFrame {
        let last = self.texts.len().saturating_sub(1);
        let top_index = position.top_index.min(last);
        let bottom_index = position.bottom_index(self.texts.len());
        let bottom_opacity = if bottom_index == top_index {
            position.opacity
        } else {
            1.0 - position.opacity
        };
        let current = if position.opacity > 0.5 {
            top_index
        } else {
            bottom_index
        };
        CaptionFrame {
            top_index,
            top_opacity: position.opacity,
            bottom_index,
            bottom_opacity,
            current_text: strip_markup(self.text(current)),
        }
    }
}

/// Screen reader text: "<alt>. <caption>", with an optional intro.
pub fn announcement(intro: Option<&str>, alt: &str, caption: &str) -> String {
    let intro = intro.map(|intro| format!("{intro} ")).unwrap_or_default();
    let text = format!("{intro}{alt}. {}", strip_markup(caption));
    text.trim_end().to_string()
}

/// Drop tags and decode the handful of entities rich-text captions use.
pub fn strip_markup(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captions() -> Captions {
        Captions::new(vec![
            "<p>First</p>".into(),
            "<p>Second &amp; more</p>".into(),
            String::new(),
        ])
    }

    #[test]
    fn frame_blends_neighbours() {
        let frame = captions().frame(&ContentPosition {
            top_index: 0,
            opacity: 0.3,
        });
        assert_eq!((frame.top_index, frame.bottom_index), (0, 1));
        assert!((frame.bottom_opacity - 0.7).abs() < 1e-9);
        assert_eq!(frame.current_text, "Second & more");
    }

    #[test]
    fn last_item_has_no_neighbour() {
        let frame = captions().frame(&ContentPosition::settled(2));
        assert_eq!((frame.top_index, frame.bottom_index), (2, 2));
        assert_eq!(frame.bottom_opacity, 1.0);
        assert_eq!(frame.current_text, "");
    }

    #[test]
    fn announcement_strips_markup() {
        assert_eq!(
            announcement(None, "Glacier 1900", "<p>The <strong>old</strong> glacier</p>"),
            "Glacier 1900. The old glacier"
        );
        assert_eq!(announcement(Some("Image"), "Dam", ""), "Image Dam.");
    }

    #[test]
    fn any_ignores_empty_captions() {
        assert!(captions().any());
        assert!(!Captions::new(vec![String::new(), String::new()]).any());
    }
}
