pub mod alerts_entity;
pub mod settings_entity;

#[derive(Debug, Clone, Default)]
pub struct DataEntities {
    pub alerts: alerts_entity::AlertsEntity,
    pub settings: settings_entity::SettingsEntity,
}
