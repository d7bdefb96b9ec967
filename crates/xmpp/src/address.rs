//! XMPP addresses (`node@domain/resource`) as seen by the observers.

use std::fmt;

use crate::{Error, Result};

/// A decomposed XMPP address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub node: Option<String>,
    pub domain: String,
    pub resource: Option<String>,
}

impl Address {
    pub fn new(
        node: Option<impl Into<String>>,
        domain: impl Into<String>,
        resource: Option<impl Into<String>>,
    ) -> Self {
        Self {
            node: node.map(Into::into),
            domain: domain.into(),
            resource: resource.map(Into::into),
        }
    }

    /// Parse `node@domain/resource`; node and resource are optional.
    ///
    /// Everything after the first `/` is the resource, which may itself
    /// contain `@` or `/`. Node and domain are lowercased, the resource keeps
    /// its case, matching the server's view of the address.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::invalid_address(input, "empty address"));
        }

        let (bare, resource) = match input.split_once('/') {
            Some((_, "")) => return Err(Error::invalid_address(input, "empty resource")),
            Some((bare, resource)) => (bare, Some(resource)),
            None => (input, None),
        };

        let (node, domain) = match bare.split_once('@') {
            Some(("", _)) => return Err(Error::invalid_address(input, "empty node")),
            Some((node, domain)) => (Some(node), domain),
            None => (None, bare),
        };

        if domain.is_empty() {
            return Err(Error::invalid_address(input, "empty domain"));
        }
        if domain.contains('@') {
            return Err(Error::invalid_address(input, "more than one '@'"));
        }
        if bare.chars().any(char::is_whitespace) {
            return Err(Error::invalid_address(input, "whitespace in address"));
        }

        Ok(Self::new(
            node.map(str::to_lowercase),
            domain.to_lowercase(),
            resource,
        ))
    }

    /// The address without its resource.
    #[must_use]
    pub fn bare(&self) -> Self {
        Self {
            node: self.node.clone(),
            domain: self.domain.clone(),
            resource: None,
        }
    }

    /// `node@domain`, or just `domain` for server addresses.
    #[must_use]
    pub fn bare_string(&self) -> String {
        self.bare().to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref node) = self.node {
            write!(f, "{node}@")?;
        }
        f.write_str(&self.domain)?;
        if let Some(ref resource) = self.resource {
            write!(f, "/{resource}")?;
        }
        Ok(())
    }
}

/// A configured room: `room@service`, optionally with `/nick`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomAddress {
    room: Address,
    nick: Option<String>,
}

impl RoomAddress {
    pub fn parse(input: &str) -> Result<Self> {
        let mut address = Address::parse(input)?;
        if address.node.is_none() {
            return Err(Error::invalid_address(input, "room address needs a room name"));
        }
        let nick = address.resource.take();
        Ok(Self {
            room: address,
            nick,
        })
    }

    /// The bare room address, used as the `room` field and routing key.
    #[must_use]
    pub fn room(&self) -> String {
        self.room.to_string()
    }

    pub fn nick(&self) -> Option<&str> {
        self.nick.as_deref()
    }

    /// Fill in the nickname when the configured address did not carry one.
    #[must_use]
    pub fn with_default_nick(mut self, nick: &str) -> Self {
        if self.nick.is_none() {
            self.nick = Some(nick.to_string());
        }
        self
    }

    /// The occupant address used to join: `room@service/nick`.
    #[must_use]
    pub fn occupant(&self) -> Address {
        Address {
            resource: self.nick.clone(),
            ..self.room.clone()
        }
    }
}

impl fmt::Display for RoomAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.occupant().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[test]
    fn renders_node_domain_resource() {
        let address = Address::new(Some("alice"), "example.com", Some("phone"));
        assert_eq!(address.to_string(), "alice@example.com/phone");
    }

    #[rstest]
    #[case("alice@example.com/phone", Some("alice"), "example.com", Some("phone"))]
    #[case("alice@example.com", Some("alice"), "example.com", None)]
    #[case("example.com", None, "example.com", None)]
    #[case("example.com/admin", None, "example.com", Some("admin"))]
    #[case("room@muc.example.com/nick/with@odd", Some("room"), "muc.example.com", Some("nick/with@odd"))]
    fn parses(
        #[case] input: &str,
        #[case] node: Option<&str>,
        #[case] domain: &str,
        #[case] resource: Option<&str>,
    ) {
        let address = Address::parse(input).unwrap();
        assert_eq!(address.node.as_deref(), node);
        assert_eq!(address.domain, domain);
        assert_eq!(address.resource.as_deref(), resource);
        assert_eq!(address.to_string(), input);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("@example.com")]
    #[case("alice@")]
    #[case("alice@example.com/")]
    #[case("a@b@c")]
    #[case("al ice@example.com")]
    fn rejects(#[case] input: &str) {
        assert!(matches!(
            Address::parse(input),
            Err(Error::InvalidAddress { .. })
        ));
    }

    #[test]
    fn bare_drops_resource() {
        let address = Address::parse("bob@example.com/laptop").unwrap();
        assert_eq!(address.bare_string(), "bob@example.com");
    }

    #[test]
    fn room_address_splits_nick() {
        let room = RoomAddress::parse("team@conference.example.com/bot").unwrap();
        assert_eq!(room.room(), "team@conference.example.com");
        assert_eq!(room.nick(), Some("bot"));
        assert_eq!(room.to_string(), "team@conference.example.com/bot");
    }

    #[test]
    fn room_address_default_nick() {
        let room = RoomAddress::parse("team@conference.example.com")
            .unwrap()
            .with_default_nick("feeder");
        assert_eq!(room.occupant().to_string(), "team@conference.example.com/feeder");

        let kept = RoomAddress::parse("team@conference.example.com/me")
            .unwrap()
            .with_default_nick("feeder");
        assert_eq!(kept.nick(), Some("me"));
    }

    #[rstest]
    #[case("Alice@Example.COM/Phone", "alice@example.com/Phone")]
    #[case("EXAMPLE.com", "example.com")]
    fn lowercases_node_and_domain(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Address::parse(input).unwrap().to_string(), expected);
    }

    #[test]
    fn mixed_case_room_keys_on_lowercase() {
        let room = RoomAddress::parse("Team@Conference.Example.com/Bot").unwrap();
        assert_eq!(room.room(), "team@conference.example.com");
        assert_eq!(room.nick(), Some("Bot"));
        assert_eq!(
            room.room(),
            Address::parse("team@conference.example.com/bob")
                .unwrap()
                .bare_string()
        );
    }

    #[test]
    fn room_address_needs_node() {
        assert!(RoomAddress::parse("conference.example.com").is_err());
    }
}
