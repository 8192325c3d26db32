//! Settings store -- site configuration and payment gateways.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::command::CommandContext;
use crate::store::Store;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Site identity and contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralSettings {
    pub site_name: String,
    pub site_url: String,
    pub email: String,
    pub address: String,
    pub phone: String,
}

/// Partial update of [`GeneralSettings`]. Absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettingsPatch {
    pub site_name: Option<String>,
    pub site_url: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl GeneralSettings {
    fn merge(&mut self, patch: &GeneralSettingsPatch) {
        merge_field(&mut self.site_name, &patch.site_name);
        merge_field(&mut self.site_url, &patch.site_url);
        merge_field(&mut self.email, &patch.email);
        merge_field(&mut self.address, &patch.address);
        merge_field(&mut self.phone, &patch.phone);
    }
}

/// Upload limits and branding assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSettings {
    /// Path of the uploaded logo, if any.
    pub logo: Option<String>,
    pub favicon: Option<String>,
    pub max_file_size_mb: u32,
    /// MIME pattern such as `image/*`.
    pub allowed_types: String,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            logo: None,
            favicon: None,
            max_file_size_mb: 5,
            allowed_types: "image/*".to_owned(),
        }
    }
}

/// Partial update of [`MediaSettings`].
///
/// `logo` and `favicon` are doubly optional: `None` leaves the asset alone,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none", with = "double_option")]
    pub logo: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none", with = "double_option")]
    pub favicon: Option<Option<String>>,
    pub max_file_size_mb: Option<u32>,
    pub allowed_types: Option<String>,
}

impl MediaSettings {
    fn merge(&mut self, patch: &MediaSettingsPatch) {
        merge_field(&mut self.logo, &patch.logo);
        merge_field(&mut self.favicon, &patch.favicon);
        merge_field(&mut self.max_file_size_mb, &patch.max_file_size_mb);
        merge_field(&mut self.allowed_types, &patch.allowed_types);
    }
}

fn merge_field<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

/// Distinguishes an explicit `null` (clear) from a missing key (keep).
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Option<String>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<String>>, D::Error> {
        Option::<String>::deserialize(deserializer).map(Some)
    }
}

/// Whether a gateway talks to the provider's sandbox or production API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    #[default]
    Test,
    Live,
}

/// API credentials for a payment gateway.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub api_key: String,
    pub secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// A configured payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentGateway {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub mode: GatewayMode,
    pub enabled: bool,
    pub credentials: Credentials,
}

/// Whole settings page state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsStore {
    pub general: GeneralSettings,
    pub media: MediaSettings,
    pub payment_gateways: Vec<PaymentGateway>,
    /// Platform commission in percent.
    pub commission_rate: f64,
}

impl SettingsStore {
    pub fn gateway(&self, id: &str) -> Option<&PaymentGateway> {
        self.payment_gateways.iter().find(|g| g.id == id)
    }

    /// Gateways currently switched on.
    pub fn enabled_gateways(&self) -> impl Iterator<Item = &PaymentGateway> {
        self.payment_gateways.iter().filter(|g| g.enabled)
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Commands accepted by the [`SettingsStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SettingsCommand {
    UpdateGeneral(GeneralSettingsPatch),
    UpdateMedia(MediaSettingsPatch),
    AddGateway(PaymentGateway),
    UpdateGateway(PaymentGateway),
    DeleteGateway { id: String },
    SetCommissionRate { rate: f64 },
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Domain events produced by the [`SettingsStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SettingsEvent {
    GeneralUpdated(GeneralSettingsPatch),
    MediaUpdated(MediaSettingsPatch),
    GatewayAdded(PaymentGateway),
    GatewayUpdated(PaymentGateway),
    GatewayDeleted { id: String },
    CommissionRateSet { rate: f64 },
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from [`SettingsCommand`] handling.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("payment gateway {0} already exists")]
    DuplicateGateway(String),
    #[error("commission rate must be a finite, non-negative percentage, got {0}")]
    InvalidCommissionRate(f64),
}

// ---------------------------------------------------------------------------
// Store impl
// ---------------------------------------------------------------------------

impl Store for SettingsStore {
    const STORE_NAME: &'static str = "settings";
    type Command = SettingsCommand;
    type DomainEvent = SettingsEvent;
    type Error = SettingsError;

    fn handle(
        &self,
        cmd: SettingsCommand,
        _ctx: &CommandContext,
    ) -> Result<Vec<SettingsEvent>, SettingsError> {
        match cmd {
            SettingsCommand::UpdateGeneral(patch) => Ok(vec![SettingsEvent::GeneralUpdated(patch)]),
            SettingsCommand::UpdateMedia(patch) => Ok(vec![SettingsEvent::MediaUpdated(patch)]),
            SettingsCommand::AddGateway(gateway) => {
                if self.gateway(&gateway.id).is_some() {
                    return Err(SettingsError::DuplicateGateway(gateway.id));
                }
                Ok(vec![SettingsEvent::GatewayAdded(gateway)])
            }
            SettingsCommand::UpdateGateway(gateway) => {
                if self.gateway(&gateway.id).is_none() {
                    tracing::debug!(id = %gateway.id, "update ignored: gateway not found");
                    return Ok(vec![]);
                }
                Ok(vec![SettingsEvent::GatewayUpdated(gateway)])
            }
            SettingsCommand::DeleteGateway { id } => {
                if self.gateway(&id).is_none() {
                    tracing::debug!(%id, "delete ignored: gateway not found");
                    return Ok(vec![]);
                }
                Ok(vec![SettingsEvent::GatewayDeleted { id }])
            }
            SettingsCommand::SetCommissionRate { rate } => {
                if !rate.is_finite() || rate < 0.0 {
                    return Err(SettingsError::InvalidCommissionRate(rate));
                }
                Ok(vec![SettingsEvent::CommissionRateSet { rate }])
            }
        }
    }

    fn apply(mut self, event: &SettingsEvent) -> Self {
        match event {
            SettingsEvent::GeneralUpdated(patch) => self.general.merge(patch),
            SettingsEvent::MediaUpdated(patch) => self.media.merge(patch),
            SettingsEvent::GatewayAdded(gateway) => self.payment_gateways.push(gateway.clone()),
            SettingsEvent::GatewayUpdated(gateway) => {
                if let Some(slot) = self
                    .payment_gateways
                    .iter_mut()
                    .find(|g| g.id == gateway.id)
                {
                    *slot = gateway.clone();
                }
            }
            SettingsEvent::GatewayDeleted { id } => self.payment_gateways.retain(|g| g.id != *id),
            SettingsEvent::CommissionRateSet { rate } => self.commission_rate = *rate,
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(id: &str, name: &str) -> PaymentGateway {
        PaymentGateway {
            id: id.into(),
            name: name.into(),
            mode: GatewayMode::Test,
            enabled: true,
            credentials: Credentials {
                api_key: format!("{id}_key"),
                secret: format!("{id}_secret"),
            },
        }
    }

    fn run(store: SettingsStore, cmd: SettingsCommand) -> SettingsStore {
        let events = store
            .handle(cmd, &CommandContext::default())
            .expect("command should succeed");
        events.into_iter().fold(store, |s, e| s.apply(&e))
    }

    fn store() -> SettingsStore {
        SettingsStore {
            general: GeneralSettings {
                site_name: "Admin Dashboard".into(),
                site_url: "https://example.com".into(),
                email: "admin@example.com".into(),
                address: "1 Main St".into(),
                phone: "+1 555 0100".into(),
            },
            payment_gateways: vec![gateway("paypal", "PayPal")],
            ..SettingsStore::default()
        }
    }

    #[test]
    fn general_patch_merges_present_fields_only() {
        let patch: GeneralSettingsPatch =
            serde_json::from_value(serde_json::json!({"site_name": "Ops Console"}))
                .expect("partial patch");
        let next = run(store(), SettingsCommand::UpdateGeneral(patch));
        assert_eq!(next.general.site_name, "Ops Console");
        assert_eq!(next.general.email, "admin@example.com");
    }

    #[test]
    fn media_patch_can_clear_logo() {
        let mut initial = store();
        initial.media.logo = Some("/uploads/logo.png".into());

        let keep: MediaSettingsPatch =
            serde_json::from_value(serde_json::json!({"max_file_size_mb": 10})).expect("patch");
        let next = run(initial, SettingsCommand::UpdateMedia(keep));
        assert_eq!(next.media.logo.as_deref(), Some("/uploads/logo.png"));
        assert_eq!(next.media.max_file_size_mb, 10);

        let clear: MediaSettingsPatch =
            serde_json::from_value(serde_json::json!({"logo": null})).expect("patch");
        let next = run(next, SettingsCommand::UpdateMedia(clear));
        assert_eq!(next.media.logo, None);
        assert_eq!(next.media.allowed_types, "image/*");
    }

    #[test]
    fn gateway_lifecycle() {
        let next = run(store(), SettingsCommand::AddGateway(gateway("stripe", "Stripe")));
        assert_eq!(next.payment_gateways.len(), 2);

        let mut live = gateway("stripe", "Stripe");
        live.mode = GatewayMode::Live;
        live.enabled = false;
        let next = run(next, SettingsCommand::UpdateGateway(live));
        assert_eq!(next.gateway("stripe").map(|g| g.mode), Some(GatewayMode::Live));
        assert_eq!(next.enabled_gateways().count(), 1);

        let next = run(next, SettingsCommand::DeleteGateway { id: "paypal".into() });
        assert!(next.gateway("paypal").is_none());
    }

    #[test]
    fn duplicate_gateway_rejected() {
        let result = store().handle(
            SettingsCommand::AddGateway(gateway("paypal", "PayPal again")),
            &CommandContext::default(),
        );
        assert!(matches!(result, Err(SettingsError::DuplicateGateway(id)) if id == "paypal"));
    }

    #[test]
    fn unknown_gateway_update_is_noop() {
        let events = store()
            .handle(
                SettingsCommand::UpdateGateway(gateway("adyen", "Adyen")),
                &CommandContext::default(),
            )
            .expect("not found is not an error");
        assert!(events.is_empty());
    }

    #[test]
    fn commission_rate_validation() {
        let next = run(store(), SettingsCommand::SetCommissionRate { rate: 3.5 });
        assert_eq!(next.commission_rate, 3.5);

        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let result =
                next.handle(SettingsCommand::SetCommissionRate { rate: bad }, &CommandContext::default());
            assert!(matches!(result, Err(SettingsError::InvalidCommissionRate(_))));
        }
    }

    #[test]
    fn credentials_debug_hides_secret() {
        let rendered = format!("{:?}", gateway("paypal", "PayPal"));
        assert!(rendered.contains("paypal_key"));
        assert!(!rendered.contains("paypal_secret"));
    }

    #[test]
    fn gateway_mode_wire_form() {
        let json = serde_json::to_value(gateway("paypal", "PayPal")).expect("serialize");
        assert_eq!(json["type"], "test");
    }
}
