//! HTML renderer
//!
//! Every function returns a freshly built string; callers replace the whole
//! container with it, so repeated renders never accumulate stale markup.

use crate::gallery::{select_featured, BrowseState, CollectionGroup};
use crate::lightbox::{
    BACKDROP_CLASS, CLOSE_CLASS, DATA_FULL, DATA_TITLE, OVERLAY_CAPTION_ID, OVERLAY_ID,
    OVERLAY_IMAGE_ID, TRIGGER_CLASS,
};
use photosite_common::{AssetPaths, Image, MetadataDocument};
use std::collections::BTreeSet;
use std::fmt::Write;

pub const EMPTY_STATE_MESSAGE: &str = "No images found matching these categories.";

/// Escape text for HTML element content and quoted attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `1 image` / `N images`
pub fn image_count_label(count: usize) -> String {
    if count == 1 {
        "1 image".to_string()
    } else {
        format!("{} images", count)
    }
}

/// Human-facing tag label: hyphens shown as spaces
pub fn tag_label(tag: &str) -> String {
    tag.replace('-', " ")
}

/// Browse URL for a tag selection; an empty selection links to "all"
pub fn browse_href(selection: &BTreeSet<String>) -> String {
    let joined = selection
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(",");
    format!("/browse?tags={}", urlencoding::encode(&joined))
}

/// Collection page URL
pub fn collection_href(slug: &str) -> String {
    format!("/collection?id={}", urlencoding::encode(slug))
}

/// Renders gallery markup for one site
#[derive(Debug, Clone)]
pub struct Renderer {
    paths: AssetPaths,
    site_title: String,
}

impl Renderer {
    pub fn new(paths: AssetPaths, site_title: impl Into<String>) -> Self {
        Self {
            paths,
            site_title: site_title.into(),
        }
    }

    /// `<img>` lightbox trigger for one image, linked to the full-resolution
    /// file so it stays reachable without the overlay
    fn trigger_img(&self, collection_id: &str, image: &Image) -> String {
        let thumb = self.paths.thumbnail_url(collection_id, &image.filename);
        let full = self.paths.full_res_url(collection_id, &image.filename);
        format!(
            r#"<a class="lightbox-link" href="{full}"><img class="{trigger}" src="{src}" {data_full}="{full}" alt="{alt}" {data_title}="{title}" loading="lazy" /></a>"#,
            trigger = TRIGGER_CLASS,
            src = escape_html(&thumb),
            data_full = DATA_FULL,
            full = escape_html(&full),
            alt = escape_html(&image.description),
            data_title = DATA_TITLE,
            title = escape_html(&image.title),
        )
    }

    /// Figure with thumbnail and caption
    pub fn figure(&self, collection_id: &str, image: &Image) -> String {
        format!(
            "<figure>\n  {}\n  <figcaption>{}</figcaption>\n</figure>\n",
            self.trigger_img(collection_id, image),
            escape_html(&image.title)
        )
    }

    fn group_section(&self, group: &CollectionGroup<'_>) -> String {
        let mut html = String::new();
        let _ = writeln!(html, r#"<section class="category-section">"#);
        let _ = writeln!(
            html,
            r#"<h3>{} <span class="image-count">({})</span></h3>"#,
            escape_html(group.collection_title),
            image_count_label(group.images.len())
        );
        html.push_str("<div class=\"gallery\">\n");
        for loaded in &group.images {
            html.push_str(&self.figure(&loaded.collection_id, &loaded.image));
        }
        html.push_str("</div>\n</section>\n");
        html
    }

    /// Browse galleries: one section per non-empty collection group, or the
    /// empty-state notice when nothing matches
    pub fn browse_galleries(&self, state: &BrowseState) -> String {
        let groups = state.grouped();
        if groups.is_empty() {
            return format!(
                "<div class=\"empty-state\">\n  <p>{}</p>\n</div>\n",
                EMPTY_STATE_MESSAGE
            );
        }

        groups.iter().map(|g| self.group_section(g)).collect()
    }

    /// Tag filter controls; each links to the toggled selection
    pub fn tag_controls(&self, state: &BrowseState) -> String {
        let selected = state.selected();
        let mut html = String::from("<nav id=\"tag-filter\" class=\"tag-filter\">\n");

        let all_class = if selected.is_empty() {
            "tag-button all active"
        } else {
            "tag-button all"
        };
        let _ = writeln!(
            html,
            r#"  <a class="{}" href="{}">All Images</a>"#,
            all_class,
            escape_html(&browse_href(&BTreeSet::new()))
        );

        for tag in state.tags() {
            let mut toggled = selected.clone();
            if !toggled.remove(tag) {
                toggled.insert(tag.clone());
            }
            let class = if selected.contains(tag) {
                "tag-button active"
            } else {
                "tag-button"
            };
            let _ = writeln!(
                html,
                r#"  <a class="{}" data-tag="{}" href="{}">{}</a>"#,
                class,
                escape_html(tag),
                escape_html(&browse_href(&toggled)),
                escape_html(&tag_label(tag))
            );
        }

        html.push_str("</nav>\n");
        html
    }

    /// Homepage preview of one collection: featured subset plus a link to
    /// the full collection noting how many images are not shown
    pub fn featured_section(&self, document: &MetadataDocument, fallback: usize) -> String {
        let collection = &document.collection;
        let shown = select_featured(&document.images, fallback);
        let total = document.images.len();
        let hidden = total - shown.len();

        let mut html = String::new();
        let _ = writeln!(
            html,
            r#"<section class="gallery-section" id="gallery-{}">"#,
            escape_html(&collection.id)
        );
        let _ = writeln!(
            html,
            "<div class=\"collection-header\">\n  <h2>{}</h2>\n  <p class=\"collection-meta\">{} &bull; {}</p>\n  <p class=\"collection-description\">{}</p>\n</div>",
            escape_html(&collection.title),
            escape_html(&collection.location),
            escape_html(&collection.date),
            escape_html(&collection.description)
        );

        html.push_str("<div class=\"gallery\">\n");
        for image in shown {
            html.push_str(&self.figure(&collection.id, image));
        }
        html.push_str("</div>\n");

        let count_text = if hidden > 0 {
            format!(" (+{} more)", hidden)
        } else {
            String::new()
        };
        let _ = writeln!(
            html,
            "<div class=\"view-collection-link\">\n  <a href=\"{}\" aria-label=\"View all {} images in {} collection\">View Full Collection{} &rarr;</a>\n</div>",
            escape_html(&collection_href(collection.link_slug())),
            total,
            escape_html(&collection.title),
            count_text
        );
        html.push_str("</section>\n");
        html
    }

    /// Homepage body: featured previews in load order
    pub fn homepage(&self, documents: &[MetadataDocument], fallback: usize) -> String {
        if documents.is_empty() {
            return "<div class=\"empty-state\">\n  <p>No collections are available right now.</p>\n</div>\n"
                .to_string();
        }
        let sections: String = documents
            .iter()
            .map(|d| self.featured_section(d, fallback))
            .collect();
        format!("<div id=\"collections-container\">\n{}</div>\n", sections)
    }

    /// Browse view body: tag controls plus galleries
    pub fn browse(&self, state: &BrowseState) -> String {
        format!(
            "{}<div id=\"browse-galleries\">\n{}</div>\n",
            self.tag_controls(state),
            self.browse_galleries(state)
        )
    }

    /// Full collection page body
    pub fn collection(&self, document: &MetadataDocument) -> String {
        let collection = &document.collection;
        let mut html = String::new();

        let _ = writeln!(
            html,
            "<header id=\"collection-header\">\n  <h1>{}</h1>\n  <span>{} &bull; {}</span>\n</header>",
            escape_html(&collection.title),
            escape_html(&collection.location),
            escape_html(&collection.date)
        );
        let _ = writeln!(
            html,
            "<div id=\"collection-intro\"><p>{}</p></div>",
            escape_html(&collection.description)
        );

        html.push_str("<div id=\"collection-grid\" class=\"gallery\">\n");
        for image in &document.images {
            let print_info = image
                .starting_price()
                .map(|price| format!("\n    <div class=\"print-meta\">Prints starting at ${}</div>", price))
                .unwrap_or_default();
            let _ = writeln!(
                html,
                "<figure>\n  <div class=\"image-wrapper\">\n    {}\n  </div>\n  <figcaption>\n    <strong>{}</strong>{}\n  </figcaption>\n</figure>",
                self.trigger_img(&collection.id, image),
                escape_html(&image.title),
                print_info
            );
        }
        html.push_str("</div>\n");
        html
    }

    /// Error state with a link back to the main page
    pub fn error_state(&self, message: &str) -> String {
        format!(
            "<div class=\"error-state\">\n  <h2>Error</h2>\n  <p>{}</p>\n  <a href=\"/\" class=\"button\">Return Home</a>\n</div>\n",
            escape_html(message)
        )
    }

    /// Lightbox overlay, hidden until a trigger is activated
    pub fn lightbox_overlay(&self) -> String {
        format!(
            r#"<div id="{overlay}" class="lightbox" aria-hidden="true" role="dialog">
  <div class="{backdrop}"></div>
  <figure class="lightbox-content">
    <button type="button" class="{close}" aria-label="Close">&times;</button>
    <img id="{image}" src="" alt="" />
    <figcaption id="{caption}"></figcaption>
  </figure>
</div>
"#,
            overlay = OVERLAY_ID,
            backdrop = BACKDROP_CLASS,
            close = CLOSE_CLASS,
            image = OVERLAY_IMAGE_ID,
            caption = OVERLAY_CAPTION_ID,
        )
    }

    /// Whole document: page title, navigation, main content, lightbox
    pub fn page(&self, title: Option<&str>, main: &str) -> String {
        let full_title = match title {
            Some(t) => format!("{} · {}", t, self.site_title),
            None => self.site_title.clone(),
        };
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<link rel="stylesheet" href="/assets/css/style.css">
</head>
<body>
<nav class="site-nav"><a href="/">{site}</a> <a href="/browse">Browse</a></nav>
<main id="main">
{main}</main>
{overlay}</body>
</html>
"#,
            title = escape_html(&full_title),
            site = escape_html(&self.site_title),
            main = main,
            overlay = self.lightbox_overlay(),
        )
    }
}
