// CLI text → operational command XML
//
// `show interface "ethernet1/1"` becomes
// `<show><interface>ethernet1/1</interface></show>`: every bare word
// opens an element, a quoted word is the text of the element before it.

use quick_xml::escape::escape;

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Word(String),
    Quoted(String),
}

fn tokenize(command: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = command.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '"' {
            chars.next();
            let text: String = chars.by_ref().take_while(|&c| c != '"').collect();
            tokens.push(Token::Quoted(text));
        } else {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == '"' {
                    break;
                }
                word.push(c);
                chars.next();
            }
            tokens.push(Token::Word(word));
        }
    }
    tokens
}

/// Convert an operational CLI command into the XML the API expects.
///
/// Input that already looks like XML is returned unchanged.
pub fn cli_to_xml(command: &str) -> String {
    let command = command.trim();
    if command.starts_with('<') {
        return command.to_owned();
    }

    let tokens = tokenize(command);
    let mut xml = String::new();
    let mut open: Vec<&str> = Vec::new();
    let mut iter = tokens.iter().peekable();

    while let Some(token) = iter.next() {
        match token {
            Token::Word(word) => match iter.peek() {
                Some(Token::Quoted(text)) => {
                    xml.push_str(&format!("<{word}>{}</{word}>", escape(text.as_str())));
                    iter.next();
                }
                None => xml.push_str(&format!("<{word}/>")),
                Some(Token::Word(_)) => {
                    xml.push_str(&format!("<{word}>"));
                    open.push(word);
                }
            },
            Token::Quoted(text) => xml.push_str(&escape(text.as_str())),
        }
    }

    for word in open.into_iter().rev() {
        xml.push_str(&format!("</{word}>"));
    }
    xml
}
