// src/services/messaging.rs

// Só monta URIs; quem abre o cliente de e-mail ou o WhatsApp é o navegador.

const BRAZIL_COUNTRY_CODE: &str = "55";

/// `mailto:` com todos os destinatários, assunto e corpo pré-preenchidos.
pub fn mailto_uri<'a>(recipients: impl IntoIterator<Item = &'a str>, subject: &str, body: &str) -> String {
    let to = recipients
        .into_iter()
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(|email| urlencoding::encode(email).into_owned())
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "mailto:{}?subject={}&body={}",
        to,
        urlencoding::encode(subject),
        urlencoding::encode(body)
    )
}

/// Telefone só com dígitos; números nacionais (DDD + número) ganham o 55.
pub fn normalize_phone(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        0 => None,
        10 | 11 => Some(format!("{}{}", BRAZIL_COUNTRY_CODE, digits)),
        _ => Some(digits),
    }
}

/// Link `wa.me` com o texto pré-preenchido. Sem telefone, o próprio WhatsApp
/// pede para escolher o contato.
pub fn whatsapp_uri(phone: Option<&str>, text: &str) -> String {
    match phone.and_then(normalize_phone) {
        Some(number) => format!("https://wa.me/{}?text={}", number, urlencoding::encode(text)),
        None => format!("https://wa.me/?text={}", urlencoding::encode(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailto_joins_and_encodes() {
        let uri = mailto_uri(
            ["maria@cliente.com.br", " ", "joao+compras@cliente.com.br"],
            "Orçamento FTC 2026-0042",
            "Segue o link:\nhttps://x/y?token=a&b",
        );
        assert_eq!(
            uri,
            "mailto:maria%40cliente.com.br,joao%2Bcompras%40cliente.com.br\
             ?subject=Or%C3%A7amento%20FTC%202026-0042\
             &body=Segue%20o%20link%3A%0Ahttps%3A%2F%2Fx%2Fy%3Ftoken%3Da%26b"
        );
    }

    #[test]
    fn phones_are_reduced_to_digits() {
        assert_eq!(normalize_phone("(11) 98888-7777").as_deref(), Some("5511988887777"));
        assert_eq!(normalize_phone("11 3333-4444").as_deref(), Some("551133334444"));
        assert_eq!(normalize_phone("+55 11 98888-7777").as_deref(), Some("5511988887777"));
        assert_eq!(normalize_phone("sem telefone"), None);
    }

    #[test]
    fn whatsapp_link_with_and_without_phone() {
        assert_eq!(
            whatsapp_uri(Some("(11) 98888-7777"), "Olá & bom dia"),
            "https://wa.me/5511988887777?text=Ol%C3%A1%20%26%20bom%20dia"
        );
        assert_eq!(whatsapp_uri(None, "oi"), "https://wa.me/?text=oi");
        assert_eq!(whatsapp_uri(Some(""), "oi"), "https://wa.me/?text=oi");
    }
}
