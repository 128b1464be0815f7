use std::collections::HashMap;

/// Runtime parameters reported by the server through ParameterStatus
/// messages (server_version, client_encoding, TimeZone, ...). Recorded
/// during the handshake and kept up to date across queries; the protocol
/// lets the server re-announce a parameter at any time.
#[derive(Debug, Clone, Default)]
pub struct ServerParameters {
    parameters: HashMap<String, String>,
}

impl ServerParameters {
    pub fn new() -> ServerParameters {
        ServerParameters {
            parameters: HashMap::new(),
        }
    }

    pub(crate) fn set_param(&mut self, name: String, value: String) {
        self.parameters.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parameters
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_overwrites_parameters() {
        let mut params = ServerParameters::new();
        params.set_param("TimeZone".to_string(), "UTC".to_string());
        params.set_param("TimeZone".to_string(), "Europe/Amsterdam".to_string());
        params.set_param("server_version".to_string(), "16.0".to_string());

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("TimeZone"), Some("Europe/Amsterdam"));
        assert_eq!(params.get("client_encoding"), None);
    }
}
