//! Plain-text summary to HTML email conversion.
//!
//! The summary text is line-oriented: paragraphs interleaved with bullet
//! lines prefixed by "- ". Parsing builds a typed node sequence first and a
//! separate pass renders it, so structure and markup stay independently
//! testable. Line content is passed through without HTML escaping; embedded
//! markup in the summary reaches the email body verbatim.

/// One structural run of the summary text, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentNode {
    Paragraph(String),
    BulletList(Vec<String>),
}

/// Split content into paragraph and bullet-list runs.
///
/// A line whose trimmed form starts with "- " joins the current bullet run
/// (opening one if needed) with the prefix stripped; any other line closes an
/// open run and becomes a paragraph, untrimmed. Empty lines become empty
/// paragraphs. A run still open at end of input is closed.
pub fn parse_content(content: &str) -> Vec<ContentNode> {
    let mut nodes = Vec::new();
    let mut bullets: Vec<String> = Vec::new();

    for line in content.split('\n') {
        let trimmed = line.trim();
        if let Some(item) = trimmed.strip_prefix("- ") {
            bullets.push(item.to_string());
        } else {
            if !bullets.is_empty() {
                nodes.push(ContentNode::BulletList(std::mem::take(&mut bullets)));
            }
            nodes.push(ContentNode::Paragraph(line.to_string()));
        }
    }

    if !bullets.is_empty() {
        nodes.push(ContentNode::BulletList(bullets));
    }

    nodes
}

/// Render parsed nodes to an HTML fragment with inline email-safe styles.
pub fn render_nodes(nodes: &[ContentNode]) -> String {
    let mut html = String::new();

    for node in nodes {
        match node {
            ContentNode::Paragraph(text) => {
                html.push_str(&format!("<p style='margin-bottom: 16px;'>{}</p>", text));
            }
            ContentNode::BulletList(items) => {
                html.push_str("<ul style='margin: 16px 0; padding-left: 20px;'>");
                for item in items {
                    html.push_str(&format!("<li>{}</li>", item));
                }
                html.push_str("</ul>");
            }
        }
    }

    html
}

/// Convert a plain-text summary to an HTML fragment.
pub fn format_content(content: &str) -> String {
    render_nodes(&parse_content(content))
}

/// Wrap a formatted fragment in the branded email template with the signature
/// block naming the doctor and clinic.
pub fn render_email(formatted_content: &str, doctor_name: &str, clinic_name: &str) -> String {
    format!(
        r#"
            <div style="font-family: Arial, sans-serif; color: #333; line-height: 1.6; max-width: 600px; margin: 0 auto; padding: 20px; background-color: #f9fafb; border-radius: 8px;">
                <h1 style="color: #1e40af; font-size: 24px; margin-bottom: 20px;">HealthLetter</h1>
                <div style="background-color: #fff; padding: 20px; border: 1px solid #e5e7eb; border-radius: 8px;">
                    <h2 style="color: #1e40af; font-size: 20px; margin-bottom: 16px;">Consultation Summary</h2>
                    {formatted_content}
                    <p style="margin-top: 20px; font-size: 14px; color: #4b5563;">
                        Best regards,<br>
                        Dr.{doctor_name}<br>
                        {clinic_name}
                    </p>
                </div>
                <p style="font-size: 12px; color: #6b7280; text-align: center; margin-top: 20px;">
                    This email was sent by HealthLetter. For questions, reply to this email or contact {clinic_name}.
                </p>
            </div>
            "#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_paragraphs_and_bullets_in_order() {
        let nodes = parse_content("Line one\n- bullet A\n- bullet B\nLine two");

        assert_eq!(
            nodes,
            vec![
                ContentNode::Paragraph("Line one".to_string()),
                ContentNode::BulletList(vec!["bullet A".to_string(), "bullet B".to_string()]),
                ContentNode::Paragraph("Line two".to_string()),
            ]
        );
    }

    #[test]
    fn bullets_only_produces_a_single_list() {
        let nodes = parse_content("- first\n- second\n- third");

        assert_eq!(
            nodes,
            vec![ContentNode::BulletList(vec![
                "first".to_string(),
                "second".to_string(),
                "third".to_string(),
            ])]
        );
    }

    #[test]
    fn content_without_bullets_never_opens_a_list() {
        let html = format_content("First paragraph\nSecond paragraph");

        assert!(!html.contains("<ul"));
        assert_eq!(html.matches("<p").count(), 2);
    }

    #[test]
    fn every_opened_list_is_closed() {
        for content in [
            "- dangling bullet",
            "intro\n- a\n- b",
            "- a\ntext\n- b",
            "- a\n- b\noutro",
        ] {
            let html = format_content(content);
            assert_eq!(
                html.matches("<ul").count(),
                html.matches("</ul>").count(),
                "unbalanced list tags for {:?}",
                content
            );
        }
    }

    #[test]
    fn list_item_count_matches_bullet_lines() {
        let content = "intro\n- one\n- two\nmiddle\n- three\noutro";
        let html = format_content(content);

        let bullet_lines = content
            .split('\n')
            .filter(|l| l.trim().starts_with("- "))
            .count();
        assert_eq!(html.matches("<li>").count(), bullet_lines);
    }

    #[test]
    fn indented_bullets_are_recognized_and_stripped() {
        let nodes = parse_content("  - indented bullet");

        assert_eq!(
            nodes,
            vec![ContentNode::BulletList(vec!["indented bullet".to_string()])]
        );
    }

    #[test]
    fn empty_lines_become_empty_paragraphs() {
        let html = format_content("first\n\nsecond");

        assert!(html.contains("<p style='margin-bottom: 16px;'></p>"));
        assert_eq!(html.matches("<p").count(), 3);
    }

    #[test]
    fn line_content_passes_through_unescaped() {
        let html = format_content("a <b>bold</b> claim\n- item & more");

        assert!(html.contains("<p style='margin-bottom: 16px;'>a <b>bold</b> claim</p>"));
        assert!(html.contains("<li>item & more</li>"));
    }

    #[test]
    fn interleaving_preserves_document_order() {
        let html = format_content("Line one\n- bullet A\n- bullet B\nLine two");

        let p1 = html.find("<p style='margin-bottom: 16px;'>Line one</p>").unwrap();
        let ul = html.find("<ul").unwrap();
        let p2 = html.find("<p style='margin-bottom: 16px;'>Line two</p>").unwrap();
        assert!(p1 < ul && ul < p2);
        assert_eq!(html.matches("<li>").count(), 2);
    }

    #[test]
    fn email_template_names_doctor_and_clinic() {
        let html = render_email("<p>body</p>", "Rivera", "Lakeside Family Clinic");

        assert!(html.contains("<p>body</p>"));
        assert!(html.contains("Dr.Rivera"));
        assert!(html.contains("Lakeside Family Clinic"));
        assert!(html.contains("HealthLetter"));
        assert!(html.contains("Consultation Summary"));
    }
}
