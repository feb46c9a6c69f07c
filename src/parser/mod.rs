pub mod classify;
pub mod extract;
pub mod matches;
pub mod numbering;
pub mod rules;
pub mod scores;
pub mod sections;
pub mod sidebar;
pub mod title;

use crate::config::Thresholds;
use crate::model::{Post, PostMeta};

/// Capitalized word run, at most three words, never crossing a line break.
pub(crate) const NAME: &str = r"[A-Z][a-z]+(?:[ \t]+[A-Z][a-z']+){0,2}";
/// One or two capitalized words.
pub(crate) const SHORT_NAME: &str = r"[A-Z][a-z]+(?:[ \t]+[A-Z][a-z']+)?";
/// Upper-case run as printed in sidebars and headings.
pub(crate) const CAPS_NAME: &str = r"[A-Z][A-Z' \t]+[A-Z]";

/// First-pass view of a post: category, title structure, numbering, sections.
pub fn analyze_post(post: &Post, t: &Thresholds) -> PostMeta {
    let event_refs = numbering::extract_event_refs(&post.full_text(), t);
    PostMeta {
        post_id: post.id,
        title: post.title.clone(),
        date: post.date.clone(),
        category: classify::classify(post, t.body_prefix_chars),
        title_parts: title::parse_title(&post.title),
        primary_event: numbering::primary_event(&event_refs),
        event_refs,
        section_count: sections::split_sections(&post.body).len(),
        body_length: post.body.chars().count(),
        image_count: post.images.len(),
    }
}
