//! Raw MIME assembly for messages with attachments

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::OutgoingEmail;

const LINE_WIDTH: usize = 76;

/// Build a `multipart/mixed` message: a UTF-8 text part followed by one
/// base64 part per attachment. Bcc recipients are left to the envelope.
pub fn build_raw_message(from: &str, email: &OutgoingEmail, boundary: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("From: {from}\r\n"));
    if !email.to.is_empty() {
        out.push_str(&format!("To: {}\r\n", email.to.join(", ")));
    }
    out.push_str(&format!("Subject: {}\r\n", encode_header(&email.subject)));
    out.push_str("MIME-Version: 1.0\r\n");
    out.push_str(&format!(
        "Content-Type: multipart/mixed; boundary=\"{boundary}\"\r\n\r\n"
    ));

    out.push_str(&format!("--{boundary}\r\n"));
    out.push_str("Content-Type: text/plain; charset=UTF-8\r\n");
    out.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
    out.push_str(&wrap_base64(email.text.as_bytes()));

    for attachment in &email.attachments {
        let filename = attachment.filename.replace('"', "");
        out.push_str(&format!("--{boundary}\r\n"));
        out.push_str(&format!(
            "Content-Type: {}; name=\"{filename}\"\r\n",
            attachment.content_type
        ));
        out.push_str(&format!(
            "Content-Disposition: attachment; filename=\"{filename}\"\r\n"
        ));
        out.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
        out.push_str(&wrap_base64(&attachment.data));
    }

    out.push_str(&format!("--{boundary}--\r\n"));
    out
}

/// RFC 2047 encoded-word for non-ASCII header values
fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_owned()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value.as_bytes()))
    }
}

fn wrap_base64(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / LINE_WIDTH * 2 + 2);
    for chunk in encoded.as_bytes().chunks(LINE_WIDTH) {
        // base64 output is ASCII
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        out.push_str("\r\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::Attachment;

    fn bill_email() -> OutgoingEmail {
        OutgoingEmail {
            to: vec!["guest@example.com".into()],
            bcc: vec!["hidden@example.com".into()],
            subject: "Your Restaurant Bill".into(),
            text: "Thanks for dining with us".into(),
            attachments: vec![Attachment::pdf("Bill.pdf", b"%PDF-1.4 test".to_vec())],
        }
    }

    #[test]
    fn message_layout() {
        let raw = build_raw_message("noreply@example.com", &bill_email(), "XYZ");
        assert!(raw.starts_with("From: noreply@example.com\r\n"));
        assert!(raw.contains("To: guest@example.com\r\n"));
        assert!(!raw.contains("hidden@example.com"));
        assert!(raw.contains("Content-Type: multipart/mixed; boundary=\"XYZ\""));
        assert!(raw.contains("Content-Disposition: attachment; filename=\"Bill.pdf\""));
        assert!(raw.contains(&STANDARD.encode(b"%PDF-1.4 test")));
        assert!(raw.ends_with("--XYZ--\r\n"));
        assert_eq!(raw.matches("--XYZ\r\n").count(), 2);
    }

    #[test]
    fn long_payloads_are_wrapped() {
        let wrapped = wrap_base64(&[0u8; 300]);
        assert!(wrapped.lines().all(|l| l.len() <= LINE_WIDTH));
        assert!(wrapped.lines().count() > 1);
    }

    #[test]
    fn non_ascii_subject_is_encoded() {
        assert_eq!(encode_header("Plain"), "Plain");
        let encoded = encode_header("Offre spéciale");
        assert!(encoded.starts_with("=?UTF-8?B?"));
        assert!(encoded.ends_with("?="));
    }
}
