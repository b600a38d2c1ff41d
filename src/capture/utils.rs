use std::io::Read;

use anyhow::Context;
use pcap_parser::{traits::PcapReaderIterator, LegacyPcapReader, Linktype, PcapBlockOwned, PcapError};

/// LLC/SNAP header announcing an 802.1X (EAPOL) payload.
const EAPOL_SNAP: [u8; 8] = [0xAA, 0xAA, 0x03, 0x00, 0x00, 0x00, 0x88, 0x8E];
const MAC_HEADER_LEN: usize = 24;
const QOS_DATA_SUBTYPE: u16 = 8;

/// Raw 802.11 frames (`LINKTYPE_IEEE802_11`).
const LINKTYPE_80211: Linktype = Linktype(105);
/// 802.11 frames behind a radiotap header (`LINKTYPE_IEEE802_11_RADIOTAP`).
const LINKTYPE_RADIOTAP: Linktype = Linktype(127);

/// Count the EAPOL data frames in a legacy pcap capture with 802.11 or radiotap link layer.
///
/// Truncated trailing records, as left behind by an interrupted capture, end the scan without an
/// error.
pub fn count_eapol_frames(capture: impl Read) -> anyhow::Result<usize> {
    let mut reader = LegacyPcapReader::new(65536, capture)
        .map_err(|e| anyhow::anyhow!("{e:?}"))
        .context("could not create pcap reader")?;

    let mut linktype = LINKTYPE_RADIOTAP;
    let mut count = 0;
    let mut stalled = false;
    loop {
        match reader.next() {
            Ok((offset, block)) => {
                match block {
                    PcapBlockOwned::LegacyHeader(header) => linktype = header.network,
                    PcapBlockOwned::Legacy(packet) => {
                        if is_eapol(linktype, packet.data) {
                            count += 1;
                        }
                    }
                    PcapBlockOwned::NG(_) => {}
                }
                reader.consume(offset);
                stalled = false;
            }
            Err(PcapError::Eof | PcapError::UnexpectedEof) => break,
            Err(PcapError::Incomplete(_)) => {
                if stalled {
                    break;
                }
                reader
                    .refill()
                    .map_err(|e| anyhow::anyhow!("{e:?}"))
                    .context("could not read capture")?;
                stalled = true;
            }
            Err(e) => anyhow::bail!("malformed capture: {e:?}"),
        }
    }

    Ok(count)
}

/// Check whether a captured frame is an 802.11 data frame carrying EAPOL.
fn is_eapol(linktype: Linktype, data: &[u8]) -> bool {
    let frame = if linktype == LINKTYPE_RADIOTAP {
        let Some(len) = data.get(2..4) else {
            return false;
        };
        let radiotap_len = u16::from_le_bytes([len[0], len[1]]) as usize;
        match data.get(radiotap_len..) {
            Some(frame) => frame,
            None => return false,
        }
    } else if linktype == LINKTYPE_80211 {
        data
    } else {
        return false;
    };

    if frame.len() < MAC_HEADER_LEN + EAPOL_SNAP.len() {
        return false;
    }
    let frame_control = u16::from_le_bytes([frame[0], frame[1]]);
    if (frame_control >> 2) & 0x3 != 2 {
        return false;
    }

    let header_len = if (frame_control >> 4) & 0xF == QOS_DATA_SUBTYPE {
        MAC_HEADER_LEN + 2
    } else {
        MAC_HEADER_LEN
    };
    frame
        .get(header_len..header_len + EAPOL_SNAP.len())
        .is_some_and(|llc| llc == EAPOL_SNAP)
}
