//! Property-based tests using proptest

use proptest::prelude::*;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddrV4};

use announce::codec::{
    decode_binary_list, encode_binary_list, encode_text_list, parse_text_list, BINARY_RECORD_LEN,
};
use announce::common::ip::normalize_ip;
use announce::common::types::Entry;
use announce::config::{ProtocolVersion, RegistryConfig};
use announce::resolver::AddressResolver;

/// IPv4エントリとホスト名エントリを混ぜた、アドレスが一意なエントリ列
fn entries_strategy() -> impl Strategy<Value = Vec<Entry>> {
    let ipv4 = prop::collection::btree_map(
        (any::<u32>(), any::<u16>()),
        (0i64..2_000_000_000, prop::option::of("[a-z0-9 |]{1,12}")),
        0..16,
    );
    let hosts = prop::collection::btree_map("[a-z]{1,8}\\.example:[0-9]{1,4}", 0i64..1_000, 0..4);
    (ipv4, hosts).prop_map(
        |(ipv4, hosts): (BTreeMap<(u32, u16), (i64, Option<String>)>, BTreeMap<String, i64>)| {
            let mut entries: Vec<Entry> = ipv4
                .into_iter()
                .map(|((ip, port), (last_seen, info))| {
                    let address = SocketAddrV4::new(Ipv4Addr::from(ip), port).to_string();
                    Entry::new(address, last_seen, info)
                })
                .collect();
            entries.extend(
                hosts
                    .into_iter()
                    .map(|(address, last_seen)| Entry::new(address, last_seen, None)),
            );
            entries
        },
    )
}

// ---------------------------------------------------------------------------
// codec: テキスト形式とバイナリ形式の一致
// ---------------------------------------------------------------------------

proptest! {
    /// バイナリ一覧はテキスト一覧のうちIPv4エントリと同じ順序・同じ内容
    #[test]
    fn binary_list_agrees_with_text_list(entries in entries_strategy()) {
        let text = encode_text_list(&entries, ProtocolVersion::V2);
        let parsed = parse_text_list(&text).unwrap();
        prop_assert_eq!(&parsed, &entries);

        let from_text: Vec<SocketAddrV4> =
            parsed.iter().filter_map(Entry::ipv4_endpoint).collect();
        let from_binary = decode_binary_list(&encode_binary_list(&entries)).unwrap();
        prop_assert_eq!(from_binary, from_text);
    }

    /// バイナリ長はIPv4エントリ数 × 6バイト
    #[test]
    fn binary_list_length_is_record_multiple(entries in entries_strategy()) {
        let ipv4_count = entries.iter().filter(|e| e.ipv4_endpoint().is_some()).count();
        prop_assert_eq!(encode_binary_list(&entries).len(), ipv4_count * BINARY_RECORD_LEN);
    }

    /// V1テキストは常に `address|time|` でinfoを出さない
    #[test]
    fn v1_text_lines_never_carry_info(entries in entries_strategy()) {
        let text = encode_text_list(&entries, ProtocolVersion::V1);
        let mut lines = text.lines();
        prop_assert_eq!(lines.next(), Some("state=list"));
        for (line, entry) in lines.zip(entries.iter()) {
            prop_assert_eq!(line, format!("{}|{}|", entry.address, entry.last_seen));
        }
    }

    /// 6の倍数でない長さは拒否される
    #[test]
    fn decode_rejects_truncated_records(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let result = decode_binary_list(&bytes);
        prop_assert_eq!(result.is_ok(), bytes.len() % BINARY_RECORD_LEN == 0);
    }
}

// ---------------------------------------------------------------------------
// Entry::is_live
// ---------------------------------------------------------------------------

proptest! {
    /// 経過時間がTTL未満なら生存、TTL以上なら失効
    #[test]
    fn liveness_matches_age(
        last_seen in 0i64..1_000_000,
        age in 0i64..300,
        ttl in 1i64..120,
    ) {
        let entry = Entry::new("a:1", last_seen, None);
        prop_assert_eq!(entry.is_live(last_seen + age, ttl), age < ttl);
    }
}

// ---------------------------------------------------------------------------
// resolver (V1)
// ---------------------------------------------------------------------------

proptest! {
    /// 1..=65535 のポートは検出IPと組み合わされてキーになる
    #[test]
    fn v1_accepts_every_nonzero_port(ip in any::<u32>(), port in 1u16..=u16::MAX) {
        let resolver = AddressResolver::new(&RegistryConfig {
            protocol: ProtocolVersion::V1,
            ..Default::default()
        });
        let params: HashMap<String, String> =
            [("port".to_string(), port.to_string())].into_iter().collect();
        let detected = IpAddr::V4(Ipv4Addr::from(ip));

        let address = resolver.resolve_address(&params, detected).unwrap();
        prop_assert_eq!(address, format!("{}:{}", detected, port));
    }

    /// 印字可能ASCIIかつ255バイト以下のinfoは受け付ける
    #[test]
    fn v1_accepts_printable_info(info in "[ -~]{0,255}") {
        let resolver = AddressResolver::new(&RegistryConfig {
            protocol: ProtocolVersion::V1,
            ..Default::default()
        });
        let params: HashMap<String, String> =
            [("info".to_string(), info.clone())].into_iter().collect();
        prop_assert_eq!(resolver.resolve_info(&params).unwrap(), Some(info.as_str()));
    }
}

// ---------------------------------------------------------------------------
// normalize_ip
// ---------------------------------------------------------------------------

proptest! {
    /// IPv4-mapped IPv6は常にIPv4に正規化される
    #[test]
    fn mapped_ipv6_normalizes_to_ipv4(raw in any::<u32>()) {
        let v4 = Ipv4Addr::from(raw);
        let mapped = IpAddr::V6(v4.to_ipv6_mapped());
        prop_assert_eq!(normalize_ip(mapped), IpAddr::V4(v4));
    }

    /// IPv6（mapped以外）はそのまま
    #[test]
    fn plain_ipv6_is_unchanged(segments in any::<[u16; 8]>()) {
        let v6 = Ipv6Addr::from(segments);
        prop_assume!(v6.to_ipv4_mapped().is_none());
        prop_assert_eq!(normalize_ip(IpAddr::V6(v6)), IpAddr::V6(v6));
    }
}
