//! Service-level metadata shared by WMS, WFS and WMTS documents.
//!
//! WMS (and WFS 1.0) describe the service in a `Service` element; WFS 1.1+
//! and WMTS use the OWS common `ServiceIdentification`/`ServiceProvider`
//! pair. Both are read into one [`ServiceMetadata`].

use std::collections::BTreeMap;

use webdata_common::{Attributions, Contact, OgcMetadata};

use crate::xml::XmlElement;

/// Which OWS address element fills [`Contact::address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    DeliveryPoint,
    AdministrativeArea,
}

impl AddressField {
    fn element(&self) -> &'static str {
        match self {
            AddressField::DeliveryPoint => "DeliveryPoint",
            AddressField::AdministrativeArea => "AdministrativeArea",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub access_constraints: Option<String>,
    pub fees: Option<String>,
    pub keyword_list: Vec<String>,
    pub online_resource: Option<String>,
    pub provider_name: Option<String>,
    pub provider_site: Option<String>,
    pub contact: Option<Contact>,
}

impl ServiceMetadata {
    /// Read a WMS-style `Service` element.
    pub fn from_service(service: &XmlElement) -> Self {
        let info = service.child("ContactInformation");
        let contact = info.and_then(|info| {
            let address = info.child("ContactAddress");
            let field = |name: &str| address.and_then(|a| a.child_text(name));
            non_empty_contact(Contact {
                address: field("Address"),
                city: Contact::join_city(field("PostCode").as_deref(), field("City").as_deref()),
                country: field("Country"),
                person: info.find_text(&["ContactPersonPrimary", "ContactPerson"]),
                position: info.child_text("ContactPosition"),
                organization: info.find_text(&["ContactPersonPrimary", "ContactOrganization"]),
            })
        });

        let provider_name = contact.as_ref().and_then(|c| c.organization.clone());
        let online_resource = service.child("OnlineResource").and_then(|o| o.href());

        Self {
            title: service.child_text("Title"),
            description: service.child_text("Abstract"),
            access_constraints: service.child_text("AccessConstraints"),
            fees: service.child_text("Fees"),
            keyword_list: keywords(service),
            provider_site: online_resource.clone(),
            online_resource,
            provider_name,
            contact,
        }
    }

    /// Read OWS common `ServiceIdentification` and `ServiceProvider` below `root`.
    pub fn from_ows(root: &XmlElement, address_field: AddressField) -> Self {
        let identification = root.child("ServiceIdentification");
        let provider = root.child("ServiceProvider");
        let ident = |name: &str| identification.and_then(|i| i.child_text(name));

        let provider_site = provider
            .and_then(|p| p.child("ProviderSite"))
            .and_then(|s| s.href());
        let provider_name = provider.and_then(|p| p.child_text("ProviderName"));

        let contact = provider.and_then(|p| p.child("ServiceContact")).and_then(|sc| {
            let address = sc.find(&["ContactInfo", "Address"]);
            let field = |name: &str| address.and_then(|a| a.child_text(name));
            non_empty_contact(Contact {
                address: field(address_field.element()),
                city: Contact::join_city(field("PostalCode").as_deref(), field("City").as_deref()),
                country: field("Country"),
                person: sc.child_text("IndividualName"),
                position: sc.child_text("PositionName"),
                organization: provider_name.clone(),
            })
        });

        Self {
            title: ident("Title"),
            description: ident("Abstract"),
            access_constraints: ident("AccessConstraints"),
            fees: ident("Fees"),
            keyword_list: identification.map(keywords).unwrap_or_default(),
            online_resource: provider_site.clone(),
            provider_name,
            provider_site,
            contact,
        }
    }

    /// Metadata for the root node of a source.
    pub fn to_root_metadata(&self, optional_parameters: &BTreeMap<String, String>) -> OgcMetadata {
        OgcMetadata {
            optional_parameters: optional_parameters.clone(),
            access_constraints: self.access_constraints.clone(),
            description: self.description.clone(),
            extent: None,
            fees: self.fees.clone(),
            keyword_list: self.keyword_list.clone(),
            online_resource: self.online_resource.clone(),
            attributions: self.attributions(),
            contact: self.contact.clone(),
        }
    }

    pub fn attributions(&self) -> Attributions {
        Attributions {
            url: self.provider_site.clone(),
            provider: self.provider_name.clone(),
        }
    }
}

fn non_empty_contact(contact: Contact) -> Option<Contact> {
    let empty = contact.address.is_none()
        && contact.city.is_none()
        && contact.country.is_none()
        && contact.person.is_none()
        && contact.position.is_none()
        && contact.organization.is_none();
    (!empty).then_some(contact)
}

/// Keywords of an element.
///
/// Reads `KeywordList/Keyword` (WMS), `Keywords/Keyword` (OWS) or a WFS 1.0
/// comma-separated `Keywords` text.
pub fn keywords(element: &XmlElement) -> Vec<String> {
    for container in ["KeywordList", "Keywords"] {
        let list = element.child_texts(container, "Keyword");
        if !list.is_empty() {
            return list;
        }
        if let Some(text) = element.child(container).and_then(|c| c.text()) {
            return text
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect();
        }
    }
    Vec::new()
}
