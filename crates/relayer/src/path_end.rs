use core::fmt::{Display, Error as FmtError, Formatter};

use serde_derive::{Deserialize, Serialize};

/// The local identifiers of one side of a relay path.
///
/// A `PathEnd` names a chain endpoint without holding a live handle to it,
/// which is what lets the controller refer to chains across the bridge.
/// Every field is optional on the wire: absent fields decode as empty strings
/// and empty fields are omitted on encode. Two descriptors are the same
/// endpoint iff all of their fields are equal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PathEnd {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub chain_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub connection_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub channel_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub port_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub order: String,
}

impl PathEnd {
    pub fn new(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            ..Default::default()
        }
    }

    pub fn with_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_connection(mut self, connection_id: impl Into<String>) -> Self {
        self.connection_id = connection_id.into();
        self
    }

    pub fn with_channel(
        mut self,
        port_id: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        self.port_id = port_id.into();
        self.channel_id = channel_id.into();
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = order.into();
        self
    }

    /// The channel ordering configured for this end, parsed case-insensitively.
    pub fn order(&self) -> Order {
        Order::from_str_lossy(&self.order)
    }
}

impl Display for PathEnd {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(
            f,
            "{}:{}/{}/{}/{}",
            self.chain_id, self.client_id, self.connection_id, self.port_id, self.channel_id
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Order {
    None,
    Unordered,
    Ordered,
}

impl Order {
    /// Unknown or empty orderings map to [`Order::None`].
    pub fn from_str_lossy(order: &str) -> Self {
        match order.to_uppercase().as_str() {
            "UNORDERED" => Self::Unordered,
            "ORDERED" => Self::Ordered,
            _ => Self::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Unordered => "UNORDERED",
            Self::Ordered => "ORDERED",
        }
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{Order, PathEnd};
    use test_log::test;

    #[test]
    fn order_is_parsed_case_insensitively() {
        let end = PathEnd::new("ibc-0").with_order("unordered");
        assert_eq!(end.order(), Order::Unordered);

        let end = PathEnd::new("ibc-0").with_order("ORDERED");
        assert_eq!(end.order(), Order::Ordered);

        assert_eq!(PathEnd::new("ibc-0").order(), Order::None);
        assert_eq!(PathEnd::new("ibc-0").with_order("chaotic").order(), Order::None);
    }

    #[test]
    fn empty_fields_are_omitted_on_encode() {
        let end = PathEnd::new("ibc-0").with_channel("transfer", "channel-3");
        let json = serde_json::to_string(&end).unwrap();

        assert_eq!(
            json,
            r#"{"chain-id":"ibc-0","channel-id":"channel-3","port-id":"transfer"}"#
        );
    }

    #[test]
    fn absent_and_empty_fields_decode_to_the_same_descriptor() {
        let sparse: PathEnd = serde_json::from_str(r#"{"chain-id":"A"}"#).unwrap();
        let full: PathEnd = serde_json::from_str(
            r#"{"chain-id":"A","client-id":"","connection-id":"","channel-id":"","port-id":"","order":""}"#,
        )
        .unwrap();

        assert_eq!(sparse, full);
        assert_eq!(sparse, PathEnd::new("A"));
    }
}
