use super::DecodedResult;
use crate::hci::packet::{HciCommandPacket, HciEventPacket};

/// Extension seam for vendor-specific opcodes (OGF 0x3F) and events (0xFF).
///
/// Implementations are injected into [`super::HciDecoder`]; adding vendor
/// support never touches the dispatch logic of the standard tables.
pub trait VendorDecoder: Send + Sync {
    /// Display name used when the vendor recognizes nothing further.
    fn vendor_id(&self) -> &str;

    fn decode_command(&self, packet: &HciCommandPacket<'_>) -> DecodedResult;

    fn decode_event(&self, packet: &HciEventPacket<'_>) -> DecodedResult;
}

/// Default vendor decoder: recognizes nothing.
pub struct UnknownVendorDecoder;

impl VendorDecoder for UnknownVendorDecoder {
    fn vendor_id(&self) -> &str {
        "Vendor Specific"
    }

    fn decode_command(&self, _packet: &HciCommandPacket<'_>) -> DecodedResult {
        DecodedResult::unknown(self.vendor_id())
    }

    fn decode_event(&self, _packet: &HciEventPacket<'_>) -> DecodedResult {
        DecodedResult::unknown(self.vendor_id())
    }
}

#[cfg(test)]
mod tests {
    use super::{UnknownVendorDecoder, VendorDecoder};
    use crate::hci::decoder::DecodeStatus;
    use crate::hci::packet::{HciCommandPacket, HciEventCode, HciEventPacket, HciOpcode};

    #[test]
    fn unknown_vendor_reports_unknown() {
        let vendor = UnknownVendorDecoder;
        let command = HciCommandPacket {
            opcode: HciOpcode::new(0xFD53),
            parameters: &[],
        };
        let decoded = vendor.decode_command(&command);
        assert_eq!(decoded.status, DecodeStatus::Unknown);
        assert_eq!(decoded.name, "Vendor Specific");
        assert!(decoded.fields.is_empty());

        let event = HciEventPacket {
            event_code: HciEventCode::new(0xFF),
            parameters: &[0x56, 0x04],
        };
        let decoded = vendor.decode_event(&event);
        assert_eq!(decoded.status, DecodeStatus::Unknown);
        assert_eq!(decoded.name, "Vendor Specific");
        assert!(decoded.fields.is_empty());
    }
}
