pub mod device;
pub mod firmware_update;
pub mod update;

pub use device::Entity as DeviceEntity;
pub use firmware_update::Entity as FirmwareUpdateEntity;
pub use update::Entity as UpdateEntity;
