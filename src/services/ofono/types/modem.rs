use crate::services::ofono::wire::wire_enum;

wire_enum! {
    /// Kind of device backing a modem object.
    pub enum ModemType as "modem type" {
        /// Emulated modem used by oFono's test plugins.
        Test => "test",
        /// Physical modem hardware.
        Hardware => "hardware",
        /// Bluetooth Hands-Free Profile audio gateway.
        Hfp => "hfp",
        /// Bluetooth SIM Access Profile client.
        Sap => "sap",
    }
}
