//! Kernel Bluetooth socket definitions not exported by `libc`.

pub const BTPROTO_HCI: libc::c_int = 1;
pub const BTPROTO_RFCOMM: libc::c_int = 3;

pub const SOL_HCI: libc::c_int = 0;
pub const HCI_FILTER: libc::c_int = 2;

pub const HCI_MAX_DEV: usize = 16;
pub const HCI_UP: u32 = 0;

/// `_IOR('H', 210, int)`
pub const HCIGETDEVLIST: libc::c_ulong = 0x8004_48d2;
/// `_IOR('H', 240, int)`
pub const HCIINQUIRY: libc::c_ulong = 0x8004_48f0;

pub const IREQ_CACHE_FLUSH: u16 = 0x0001;
/// General inquiry access code, little-endian.
pub const GIAC_LAP: [u8; 3] = [0x33, 0x8b, 0x9e];

pub const HCI_COMMAND_PKT: u8 = 0x01;
pub const HCI_EVENT_PKT: u8 = 0x04;

pub const EVT_REMOTE_NAME_REQ_COMPLETE: u8 = 0x07;
pub const EVT_CMD_STATUS: u8 = 0x0F;

/// OGF 0x01 (link control), OCF 0x0019 (remote name request).
pub const OPCODE_REMOTE_NAME_REQ: u16 = (0x01 << 10) | 0x0019;

/// `sizeof(struct hci_inquiry_req)`
pub const INQUIRY_REQ_LEN: usize = 10;
/// `sizeof(inquiry_info)` (packed)
pub const INQUIRY_INFO_LEN: usize = 14;

#[repr(C)]
pub struct SockaddrRc {
    pub rc_family: libc::sa_family_t,
    pub rc_bdaddr: [u8; 6],
    pub rc_channel: u8,
}

#[repr(C)]
pub struct SockaddrHci {
    pub hci_family: libc::sa_family_t,
    pub hci_dev: u16,
    pub hci_channel: u16,
}

#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct HciDevReq {
    pub dev_id: u16,
    pub dev_opt: u32,
}

#[repr(C)]
pub struct HciDevListReq {
    pub dev_num: u16,
    pub dev_req: [HciDevReq; HCI_MAX_DEV],
}

#[repr(C)]
#[derive(Default)]
pub struct HciFilter {
    pub type_mask: u32,
    pub event_mask: [u32; 2],
    pub opcode: u16,
}

impl HciFilter {
    pub fn events(events: &[u8]) -> Self {
        let mut filter = Self {
            type_mask: 1 << HCI_EVENT_PKT,
            ..Self::default()
        };
        for &event in events {
            filter.event_mask[usize::from(event >> 5)] |= 1 << (event & 31);
        }
        filter
    }
}
