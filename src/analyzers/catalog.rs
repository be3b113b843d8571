//! Service catalog
//!
//! Ties the loaded service definitions to the destination analyzers:
//! static characteristics per service name, plus the CIDR and URL lookup
//! tables that classify destinations into those names.

use std::collections::HashMap;

use ipnetwork::IpNetwork;

use crate::core::device::{HintMap, Service};
use super::ip::IpAnalyzer;
use super::url::UrlAnalyzer;

/// One loaded service definition
#[derive(Debug, Clone, Default)]
pub struct ServiceDefinition {
    pub name: String,
    /// Static characteristics seeded into every record of this service
    pub characteristics: HintMap,
    pub absolute_urls: Vec<String>,
    pub urls: Vec<String>,
    pub networks: Vec<IpNetwork>,
}

/// Destination classification tables, definition order preserved
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    info: HashMap<String, HintMap>,
    pub ip: IpAnalyzer,
    pub url: UrlAnalyzer,
}

impl ServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_definition(&mut self, def: ServiceDefinition) {
        let mut characteristics = def.characteristics;
        characteristics.insert("name".to_string(), def.name.clone());
        self.info.insert(def.name.clone(), characteristics);

        if !def.absolute_urls.is_empty() {
            self.url
                .insert_absolute(&def.name, def.absolute_urls.into_iter().collect());
        }
        if !def.urls.is_empty() {
            self.url.insert_suffixes(&def.name, def.urls);
        }
        if !def.networks.is_empty() {
            self.ip.insert(&def.name, def.networks);
        }
    }

    pub fn len(&self) -> usize {
        self.info.len()
    }

    pub fn is_empty(&self) -> bool {
        self.info.is_empty()
    }

    pub fn find_service_from_ip(&mut self, ip: std::net::IpAddr) -> Option<String> {
        self.ip.find_service(ip)
    }

    pub fn find_service_from_absolute_url(&mut self, url: &str) -> Option<String> {
        self.url.find_absolute(url)
    }

    pub fn find_service_from_url(&self, url: &str) -> Option<String> {
        self.url.find_suffix(url)
    }

    /// Fresh service record for a classified name, seeded with the
    /// catalog's static characteristics when the name is known
    pub fn service_record(&self, name: &str) -> Service {
        match self.info.get(name) {
            Some(characteristics) => Service::from_characteristics(characteristics.clone()),
            None => Service::named(name),
        }
    }
}
