//! Email templates and `{{token}}` substitution
//!
//! Values are HTML-escaped during a single pass; a substituted value is
//! never re-scanned, so template syntax inside a parent-supplied name stays
//! inert text. Unknown tokens are left in place.

/// Escape HTML-special characters in a substituted value
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

/// Single-pass substitution of `{{key}}` tokens from a typed mapping
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let key = after[..end].trim();
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, v)) => out.push_str(&escape_html(v)),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

pub const TRIAL_CONFIRMATION: &str = r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #2563eb;">Free trial confirmed</h2>
        <p>Hi {{parentName}},</p>
        <p>{{studentName}}'s free trial for <strong>{{className}}</strong> at
           {{venueName}} is booked for <strong>{{trialDate}}</strong>.</p>
        <p>Your booking reference is <strong>{{bookingRef}}</strong>.</p>
        <p style="color: #666; font-size: 14px;">
            Please arrive ten minutes early so the coach can meet you.
        </p>
    </div>
</body>
</html>"#;

pub const MEMBERSHIP_CONFIRMATION: &str = r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #2563eb;">Welcome to Synco</h2>
        <p>Hi {{parentName}},</p>
        <p>{{studentName}}'s membership for <strong>{{className}}</strong> at
           {{venueName}} starts on <strong>{{startDate}}</strong>.</p>
        <p>Plan: <strong>{{planName}}</strong> &mdash; {{planPrice}} per month.</p>
        <p>Your booking reference is <strong>{{bookingRef}}</strong>.</p>
    </div>
</body>
</html>"#;

pub const WAITING_LIST_CONFIRMATION: &str = r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #2563eb;">You're on the waiting list</h2>
        <p>Hi {{parentName}},</p>
        <p>{{studentName}} has been added to the waiting list for
           <strong>{{className}}</strong> at {{venueName}}.</p>
        <p>We'll be in touch as soon as a place opens up.
           Your reference is <strong>{{bookingRef}}</strong>.</p>
    </div>
</body>
</html>"#;

pub const CANCELLATION_NOTICE: &str = r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #dc2626;">Booking cancelled</h2>
        <p>Hi {{parentName}},</p>
        <p>Booking <strong>{{bookingRef}}</strong> for {{className}} at
           {{venueName}} has been cancelled.</p>
        <p style="color: #666; font-size: 14px;">
            If this was a mistake, please get in touch and we'll sort it out.
        </p>
    </div>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_tokens() {
        let out = render(
            "Hi {{name}}, see you at {{venue}}.",
            &[("name", "Alex"), ("venue", "Acton")],
        );
        assert_eq!(out, "Hi Alex, see you at Acton.");
    }

    #[test]
    fn test_render_escapes_values() {
        let out = render("Hi {{name}}!", &[("name", "<script>alert(1)</script>")]);
        assert_eq!(out, "Hi &lt;script&gt;alert(1)&lt;/script&gt;!");
    }

    #[test]
    fn test_render_leaves_unknown_tokens() {
        let out = render("Hi {{name}}, ref {{bookingRef}}.", &[("name", "Alex")]);
        assert_eq!(out, "Hi Alex, ref {{bookingRef}}.");
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        // A value containing template syntax must come out as inert text
        let out = render(
            "Hi {{name}}.",
            &[("name", "{{venue}}"), ("venue", "INJECTED")],
        );
        assert_eq!(out, "Hi {{venue}}.");
    }

    #[test]
    fn test_render_unterminated_token() {
        let out = render("Hi {{name", &[("name", "Alex")]);
        assert_eq!(out, "Hi {{name");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html("\"quote'"), "&quot;quote&#39;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_trial_template_renders() {
        let html = render(
            TRIAL_CONFIRMATION,
            &[
                ("parentName", "Jordan Lee"),
                ("studentName", "Sam Lee"),
                ("className", "Saturday 4-5yrs"),
                ("venueName", "Acton Sports Hall"),
                ("trialDate", "2026-09-05"),
                ("bookingRef", "A1B2C3D4E5F6"),
            ],
        );
        assert!(html.contains("Jordan Lee"));
        assert!(html.contains("A1B2C3D4E5F6"));
        assert!(!html.contains("{{"));
    }
}
