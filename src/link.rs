//! # Share Links
//!
//! Encodes a card into the query string of the page that renders it, and
//! decodes it back for the read-only receiver view.
//!
//! ## Format
//!
//! ```text
//! https://host/path?name=Rahim&id=4&note=Eid+Mubarak%0ASee+you+soon
//!                   │           │    └─ optional, newlines encoded
//!                   │           └─ 1-based template id
//!                   └─ required
//! ```
//!
//! Name and note are trimmed before encoding. Template ids resolve through
//! the [`template`](crate::template) registry.

use url::Url;

use crate::error::{CardError, Result};
use crate::state::CardState;
use crate::template::{self, Template};

/// Prompt shown when sharing without a name.
pub const SHARE_NAME_PROMPT: &str = "Please enter your name before sharing.";
/// Prompt shown when a received link is incomplete.
pub const INVALID_LINK: &str = "Invalid or missing parameters.";

/// A card decoded from a share link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedCard {
    pub template: &'static Template,
    pub name: String,
    pub note: String,
}

/// Build the share link for `state` on top of `base`.
///
/// Any existing query on `base` is replaced. Fails with
/// [`CardError::MissingInput`] when the name is blank.
pub fn encode(base: &Url, state: &CardState) -> Result<Url> {
    encode_with_prompt(base, state, SHARE_NAME_PROMPT)
}

pub(crate) fn encode_with_prompt(
    base: &Url,
    state: &CardState,
    prompt: &'static str,
) -> Result<Url> {
    let name = state.trimmed_name();
    if name.is_empty() {
        return Err(CardError::MissingInput(prompt));
    }
    let note = state.trimmed_note();

    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("name", name);
        query.append_pair("id", &state.template().id().to_string());
        if !note.is_empty() {
            query.append_pair("note", note);
        }
    }
    Ok(url)
}

/// Decode a share link.
///
/// Requires a non-blank `name` and an `id` naming a known template; `note`
/// is optional. Anything else is [`CardError::MissingInput`] with
/// [`INVALID_LINK`].
pub fn decode(url: &Url) -> Result<SharedCard> {
    let mut name = None;
    let mut id = None;
    let mut note = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "name" if name.is_none() => name = Some(value.into_owned()),
            "id" if id.is_none() => id = Some(value.into_owned()),
            "note" if note.is_none() => note = Some(value.into_owned()),
            _ => {}
        }
    }

    let name = name
        .filter(|n| !n.trim().is_empty())
        .ok_or(CardError::MissingInput(INVALID_LINK))?;
    let id: u32 = id
        .as_deref()
        .and_then(|s| s.trim().parse().ok())
        .ok_or(CardError::MissingInput(INVALID_LINK))?;
    let template = template::by_id(id).map_err(|_| CardError::MissingInput(INVALID_LINK))?;

    Ok(SharedCard {
        template,
        name,
        note: note.unwrap_or_default(),
    })
}

impl SharedCard {
    /// Editable state equivalent to this card.
    pub fn to_state(&self) -> CardState {
        CardState::new(self.template.ordinal(), self.name.clone(), self.note.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> Url {
        Url::parse("https://cards.example/eid/index.html?stale=1#frag").unwrap()
    }

    #[test]
    fn test_encode_parameter_order() {
        let state = CardState::new(3, "  Rahim ", "").unwrap();
        let url = encode(&base(), &state).unwrap();
        assert_eq!(
            url.as_str(),
            "https://cards.example/eid/index.html?name=Rahim&id=4"
        );
    }

    #[test]
    fn test_round_trip() {
        let state = CardState::new(3, "Rahim Uddin", "Eid Mubarak\nSee you & soon").unwrap();
        let url = encode(&base(), &state).unwrap();
        assert!(url.as_str().contains("%0A"));

        let card = decode(&url).unwrap();
        assert_eq!(card.to_state(), state);
        assert_eq!(card.template.ordinal(), 3);
    }

    #[test]
    fn test_blank_name_refused() {
        let state = CardState::new(0, "   ", "note").unwrap();
        assert!(matches!(
            encode(&base(), &state),
            Err(CardError::MissingInput(SHARE_NAME_PROMPT))
        ));
    }

    #[test]
    fn test_decode_percent_encoded_spaces() {
        let url = Url::parse("http://h/?name=Rahim%20U&id=2&note=a%0Ab").unwrap();
        let card = decode(&url).unwrap();
        assert_eq!(card.name, "Rahim U");
        assert_eq!(card.note, "a\nb");
        assert_eq!(card.template.path, "templates/template2.svg");
    }

    #[test]
    fn test_decode_rejects_bad_links() {
        for q in ["?id=1", "?name=x", "?name=x&id=0", "?name=x&id=6", "?name=x&id=two", "?name=%20&id=1"] {
            let url = Url::parse(&format!("http://h/{q}")).unwrap();
            assert!(decode(&url).is_err(), "{q}");
        }
    }

    #[test]
    fn test_unknown_id_reads_as_invalid_link() {
        let url = Url::parse("http://h/?name=Rahim&id=9").unwrap();
        let err = decode(&url).unwrap_err();
        assert!(matches!(err, CardError::MissingInput(INVALID_LINK)));
        assert_eq!(err.user_message(), "Invalid or missing parameters.");
    }
}
