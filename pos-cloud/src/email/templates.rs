use shared::models::ValetTicket;

use super::{Attachment, OutgoingEmail};

pub fn password_reset_code(to: &str, code: &str, ttl_secs: i64) -> OutgoingEmail {
    let minutes = (ttl_secs / 60).max(1);
    OutgoingEmail {
        to: vec![to.to_owned()],
        subject: "Your password reset code".into(),
        text: format!(
            "Your password reset code is: {code}\n\
             It is valid for {minutes} minutes.\n\n\
             If you did not request a reset, you can ignore this email."
        ),
        ..Default::default()
    }
}

pub fn valet_token(to: &str, ticket: &ValetTicket) -> OutgoingEmail {
    OutgoingEmail {
        to: vec![to.to_owned()],
        subject: format!("Your valet token: {}", ticket.token_number),
        text: format!(
            "Hello {owner},\n\n\
             We have parked your car {car}.\n\
             Your valet token number is {token}. Please show it when you collect the car.\n",
            owner = ticket.owner_name,
            car = ticket.car_number,
            token = ticket.token_number,
        ),
        ..Default::default()
    }
}

pub fn bill(to: &str, bill_no: Option<i64>, pdf: Vec<u8>) -> OutgoingEmail {
    let text = match bill_no {
        Some(n) => format!("Thank you for dining with us. Your bill no. {n} is attached."),
        None => "Thank you for dining with us. Your bill is attached.".to_owned(),
    };
    OutgoingEmail {
        to: vec![to.to_owned()],
        subject: "Your Restaurant Bill".into(),
        text,
        attachments: vec![Attachment::pdf("Bill.pdf", pdf)],
        ..Default::default()
    }
}

/// Offer mail; recipients are blind-copied so they never see each other
pub fn offer(recipients: Vec<String>, title: &str, pdf: Vec<u8>) -> OutgoingEmail {
    OutgoingEmail {
        bcc: recipients,
        subject: format!("A Special Offer For You: {title}"),
        text: format!("We have a special offer for you: {title}. Details are in the attached PDF."),
        attachments: vec![Attachment::pdf("Offer.pdf", pdf)],
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_code_mentions_lifetime() {
        let email = password_reset_code("a@example.com", "123456", 300);
        assert_eq!(email.to, vec!["a@example.com"]);
        assert!(email.text.contains("123456"));
        assert!(email.text.contains("5 minutes"));
    }

    #[test]
    fn bill_attaches_pdf() {
        let email = bill("a@example.com", Some(12), vec![1, 2, 3]);
        assert_eq!(email.subject, "Your Restaurant Bill");
        assert_eq!(email.attachments[0].filename, "Bill.pdf");
        assert_eq!(email.attachments[0].content_type, "application/pdf");
        assert!(email.text.contains("12"));
    }

    #[test]
    fn offer_uses_blind_copies() {
        let email = offer(
            vec!["a@example.com".into(), "b@example.com".into()],
            "Diwali Feast",
            vec![0],
        );
        assert!(email.to.is_empty());
        assert_eq!(email.bcc.len(), 2);
        assert_eq!(email.subject, "A Special Offer For You: Diwali Feast");
    }
}
