//! Everything that turns transient image references into durable ones.
//!
//! By the time content leaves the composer every embedded image must be
//! addressable as `signature;<id>`. The submit-time pass in
//! [`finalize_content`] guarantees that; the smaller helpers here back the
//! eager upload-on-paste flow driven by the composer.

use base64::Engine;
use sha2::Digest;
use sha2::Sha256;

use replydesk_protocol::PastedImage;
use replydesk_protocol::TicketId;
use replydesk_utils_html::ContentNode;
use replydesk_utils_html::for_each_element;
use replydesk_utils_html::parse_fragment;
use replydesk_utils_html::serialize;

use crate::events::ComposerEvent;
use crate::events::ComposerEventSender;
use crate::services::FileUploadService;

/// Prefix of the canonical in-content reference form.
const SIGNATURE_SCHEME: &str = "signature;";

pub(crate) fn canonical_src(signature: &str) -> String {
    format!("{SIGNATURE_SCHEME}{signature}")
}

pub(crate) fn is_canonical(src: &str) -> bool {
    src.starts_with(SIGNATURE_SCHEME)
}

/// Decode a `data:` URL into its mime type and raw bytes. Only base64
/// payloads are supported; whitespace inside the payload is tolerated.
pub(crate) fn decode_data_url(src: &str) -> Option<(String, Vec<u8>)> {
    let rest = src.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let mime = if mime.is_empty() {
        "application/octet-stream".to_string()
    } else {
        mime.to_string()
    };
    let filtered: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(filtered)
        .ok()?;
    Some((mime, bytes))
}

/// Build the local preview `src` inserted while an upload is in flight.
pub(crate) fn preview_data_url(mime: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}

/// Ephemeral object-URL handle minted by the editing surface. The bytes
/// behind it are unreachable from here, so at finalize time these nodes can
/// only be dropped.
pub(crate) fn is_object_url(src: &str) -> bool {
    src.starts_with("blob:")
}

/// Extract the signature token from an already-uploaded asset's URL. The
/// upload service stores files as `<stem>-<signature>.<ext>`, so the token
/// is whatever follows the final `-` of the last path segment's stem. Only
/// http(s) sources qualify, and to avoid mangling foreign URLs the token
/// must look like a server-issued id: at least six ASCII alphanumerics
/// mixing letters and digits. Date or counter suffixes are digits-only and
/// never match.
pub(crate) fn extract_signature_from_url(src: &str) -> Option<&str> {
    let rest = src
        .strip_prefix("https://")
        .or_else(|| src.strip_prefix("http://"))?;
    let base = rest.split(['?', '#']).next().unwrap_or(rest);
    let segment = base.rsplit('/').next().unwrap_or(base);
    let stem = segment.rsplit_once('.').map_or(segment, |(stem, _)| stem);
    let (_, token) = stem.rsplit_once('-')?;
    let looks_like_signature = token.len() >= 6
        && token.chars().all(|c| c.is_ascii_alphanumeric())
        && token.chars().any(|c| c.is_ascii_digit())
        && token.chars().any(|c| c.is_ascii_alphabetic());
    looks_like_signature.then_some(token)
}

pub(crate) fn content_digest(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

pub(crate) fn count_image_nodes(nodes: &[ContentNode]) -> usize {
    let mut count = 0;
    for_each_element(nodes, &mut |el| {
        if el.tag == "img" {
            count += 1;
        }
    });
    count
}

/// Rewrite the first image whose `src` equals `from`. Returns whether a
/// node was rewritten.
pub(crate) fn rewrite_first_image(nodes: &mut [ContentNode], from: &str, to: &str) -> bool {
    for node in nodes {
        if let ContentNode::Element(el) = node {
            if el.tag == "img" && el.attr("src") == Some(from) {
                el.set_attr("src", to);
                return true;
            }
            if rewrite_first_image(&mut el.children, from, to) {
                return true;
            }
        }
    }
    false
}

/// Remove the first image whose `src` equals `target`. Returns whether a
/// node was removed.
pub(crate) fn remove_first_image(nodes: &mut Vec<ContentNode>, target: &str) -> bool {
    let mut i = 0;
    while i < nodes.len() {
        match &mut nodes[i] {
            ContentNode::Element(el) if el.tag == "img" && el.attr("src") == Some(target) => {
                nodes.remove(i);
                return true;
            }
            ContentNode::Element(el) => {
                if remove_first_image(&mut el.children, target) {
                    return true;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    false
}

#[derive(Debug, Clone, PartialEq)]
enum ImageFate {
    Keep,
    Rewrite(String),
    Remove,
}

/// Submit-time finalization pass.
///
/// Parses `markup`, then per image node in document order: `data:` sources
/// are decoded, uploaded and rewritten to the canonical form; `blob:`
/// object URLs are removed, since nothing can be fetched through them from
/// here; asset URLs with an embedded signature are rewritten to the
/// canonical form; images whose upload fails are removed so no dangling
/// reference is submitted. Afterwards immediately adjacent duplicates
/// (identical `src`, separated by nothing or whitespace text only)
/// collapse to the first occurrence.
pub(crate) async fn finalize_content(
    markup: &str,
    ticket: &TicketId,
    uploader: &dyn FileUploadService,
    events: &ComposerEventSender,
) -> String {
    let nodes = parse_fragment(markup);

    let mut srcs: Vec<String> = Vec::new();
    for_each_element(&nodes, &mut |el| {
        if el.tag == "img" {
            srcs.push(el.attr("src").unwrap_or_default().to_string());
        }
    });

    // Uploads are awaited one at a time; order matches document order.
    let mut fates = Vec::with_capacity(srcs.len());
    for (idx, src) in srcs.iter().enumerate() {
        let fate = if src.is_empty() || is_canonical(src) {
            ImageFate::Keep
        } else if src.starts_with("data:") {
            upload_data_url(src, idx, ticket, uploader, events).await
        } else if is_object_url(src) {
            tracing::warn!("dropping image with an unresolvable object URL from outgoing content");
            events.send(ComposerEvent::UploadFailed {
                file_name: src.clone(),
                reason: "object URLs cannot be read outside the surface that created them"
                    .to_string(),
            });
            ImageFate::Remove
        } else if let Some(signature) = extract_signature_from_url(src) {
            ImageFate::Rewrite(canonical_src(signature))
        } else {
            ImageFate::Keep
        };
        fates.push(fate);
    }

    let mut next = 0;
    let mut rewritten = apply_fates(nodes, &fates, &mut next);
    collapse_adjacent_duplicates(&mut rewritten);
    serialize(&rewritten)
}

async fn upload_data_url(
    src: &str,
    index: usize,
    ticket: &TicketId,
    uploader: &dyn FileUploadService,
    events: &ComposerEventSender,
) -> ImageFate {
    let Some((mime, bytes)) = decode_data_url(src) else {
        let file_name = pasted_file_name(index, "application/octet-stream");
        tracing::warn!("dropping image with undecodable data URL from outgoing content");
        events.send(ComposerEvent::UploadFailed {
            file_name,
            reason: "could not decode data URL".to_string(),
        });
        return ImageFate::Remove;
    };
    let image = PastedImage::new(pasted_file_name(index, &mime), mime, bytes);
    match uploader.upload(ticket, &image).await {
        Ok(file) => ImageFate::Rewrite(canonical_src(&file.signature)),
        Err(e) => {
            tracing::warn!("image upload failed, removing image from outgoing content: {e}");
            events.send(ComposerEvent::UploadFailed {
                file_name: image.file_name,
                reason: e.to_string(),
            });
            ImageFate::Remove
        }
    }
}

/// File name given to images that exist only as inline data URLs.
pub(crate) fn pasted_file_name(index: usize, mime: &str) -> String {
    let ext = match mime {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        _ => "bin",
    };
    format!("pasted-image-{}.{ext}", index + 1)
}

fn apply_fates(nodes: Vec<ContentNode>, fates: &[ImageFate], next: &mut usize) -> Vec<ContentNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            ContentNode::Element(mut el) if el.tag == "img" => {
                let fate = fates.get(*next).cloned().unwrap_or(ImageFate::Keep);
                *next += 1;
                match fate {
                    ImageFate::Keep => out.push(ContentNode::Element(el)),
                    ImageFate::Rewrite(src) => {
                        el.set_attr("src", src);
                        out.push(ContentNode::Element(el));
                    }
                    ImageFate::Remove => {}
                }
            }
            ContentNode::Element(mut el) => {
                el.children = apply_fates(std::mem::take(&mut el.children), fates, next);
                out.push(ContentNode::Element(el));
            }
            other => out.push(other),
        }
    }
    out
}

/// Collapse sibling image nodes with identical `src` separated only by
/// whitespace text, keeping the first occurrence. Guards against the editor
/// race where one paste double-inserts.
fn collapse_adjacent_duplicates(nodes: &mut Vec<ContentNode>) {
    let mut result: Vec<ContentNode> = Vec::with_capacity(nodes.len());
    for mut node in nodes.drain(..) {
        if let ContentNode::Element(el) = &mut node {
            if el.tag != "img" {
                collapse_adjacent_duplicates(&mut el.children);
            }
        }
        if let Some(src) = image_src(&node) {
            let prev_src = result
                .iter()
                .rev()
                .find(|n| !is_whitespace_text(n))
                .and_then(image_src);
            if !src.is_empty() && prev_src == Some(src) {
                continue;
            }
        }
        result.push(node);
    }
    *nodes = result;
}

fn image_src(node: &ContentNode) -> Option<&str> {
    match node {
        ContentNode::Element(el) if el.tag == "img" => Some(el.attr("src").unwrap_or_default()),
        _ => None,
    }
}

fn is_whitespace_text(node: &ContentNode) -> bool {
    matches!(node, ContentNode::Text(t) if t.trim().is_empty())
}
