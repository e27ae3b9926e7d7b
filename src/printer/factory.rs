use crate::core::{
    errors::{ConfigError, PrinterError},
    state::PrinterConfig,
};

use super::{PrinterClient, PrinterType, octoprint::OctoPrintClient, prusalink::PrusaLinkClient};

/// Builds a client from `(base_url, api_key)`.
pub type ClientConstructor = fn(&str, &str) -> Box<dyn PrinterClient>;

fn octoprint(base_url: &str, api_key: &str) -> Box<dyn PrinterClient> {
    Box::new(OctoPrintClient::new(base_url, api_key))
}

fn prusalink(base_url: &str, api_key: &str) -> Box<dyn PrinterClient> {
    Box::new(PrusaLinkClient::new(base_url, api_key))
}

const CLIENT_FACTORY: &[(PrinterType, ClientConstructor)] = &[
    (PrinterType::OctoPrint, octoprint as ClientConstructor),
    (PrinterType::PrusaLink, prusalink as ClientConstructor),
];

pub fn client_constructor(printer_type: PrinterType) -> Option<ClientConstructor> {
    CLIENT_FACTORY
        .iter()
        .find(|(registered, _)| *registered == printer_type)
        .map(|(_, constructor)| *constructor)
}

/// Constructor for a stored type tag; missing tags fall back to OctoPrint.
pub fn constructor_for_tag(tag: Option<&str>) -> Result<ClientConstructor, ConfigError> {
    let printer_type = PrinterType::from_tag(tag)?;
    client_constructor(printer_type)
        .ok_or_else(|| ConfigError::UnsupportedType(printer_type.to_string()))
}

/// Turns a camera's printer config into a live client.
pub trait ClientFactory: Send + Sync {
    fn create(&self, config: &PrinterConfig) -> Result<Box<dyn PrinterClient>, PrinterError>;
}

/// The HTTP clients registered in [`CLIENT_FACTORY`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RegisteredClients;

impl ClientFactory for RegisteredClients {
    fn create(&self, config: &PrinterConfig) -> Result<Box<dyn PrinterClient>, PrinterError> {
        let constructor = constructor_for_tag(config.printer_type.as_deref())?;
        Ok(constructor(&config.base_url, &config.api_key))
    }
}
