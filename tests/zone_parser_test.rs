use std::path::Path;

use bindctl::bind::zone_parser::{RecordData, RecordType, ZoneParser};

#[test]
fn test_parse_example_zone() {
    let zone = ZoneParser::new()
        .parse_file(Path::new("tests/zone_files/example.com.zone"))
        .expect("Failed to read example.com.zone");

    assert_eq!(zone.origin, "example.com.");
    assert_eq!(zone.ttl, 3600); // $TTL 1H
    assert_eq!(zone.records.len(), 13);

    // the multi-line SOA comes out as one record with resolved fields
    let soa = &zone.records[0];
    assert_eq!(soa.name, "@");
    assert_eq!(soa.rtype, RecordType::Soa);
    match &soa.data {
        RecordData::Soa(soa) => {
            assert_eq!(soa.mname, "ns1.example.com.");
            assert_eq!(soa.rname, "hostmaster.example.com.");
            assert_eq!(soa.serial, 2024061500);
            assert_eq!(soa.refresh, 7200);
            assert_eq!(soa.retry, 600);
            assert_eq!(soa.expire, 1209600);
            assert_eq!(soa.minimum, 3600);
        }
        other => panic!("expected SOA data, got {:?}", other),
    }
}

#[test]
fn test_record_order_is_file_order() {
    let zone = ZoneParser::new()
        .parse_file(Path::new("tests/zone_files/example.com.zone"))
        .expect("Failed to read example.com.zone");

    let types: Vec<RecordType> = zone.records.iter().map(|r| r.rtype).collect();
    assert_eq!(
        types,
        vec![
            RecordType::Soa,
            RecordType::Ns,
            RecordType::Ns,
            RecordType::Mx,
            RecordType::Mx,
            RecordType::A,
            RecordType::A,
            RecordType::A,
            RecordType::Aaaa,
            RecordType::Cname,
            RecordType::Txt,
            RecordType::Srv,
            RecordType::Ptr,
        ]
    );
}

#[test]
fn test_ttl_inheritance_and_overrides() {
    let zone = ZoneParser::new()
        .parse_file(Path::new("tests/zone_files/example.com.zone"))
        .expect("Failed to read example.com.zone");

    let www = zone
        .records
        .iter()
        .find(|r| r.name == "www.example.com.")
        .expect("www record missing");
    assert_eq!(www.ttl, 300);

    let mail = zone
        .records
        .iter()
        .find(|r| r.name == "mail.example.com." && r.rtype == RecordType::A)
        .expect("mail record missing");
    assert_eq!(mail.ttl, 3600); // inherited from $TTL 1H

    let mx = zone
        .records
        .iter()
        .find(|r| r.rtype == RecordType::Mx)
        .expect("MX record missing");
    assert_eq!(mx.ttl, 600);
}

#[test]
fn test_owner_name_qualification() {
    let zone = ZoneParser::new()
        .parse_file(Path::new("tests/zone_files/example.com.zone"))
        .expect("Failed to read example.com.zone");

    // apex sentinel untouched, relative names qualified, FQDNs verbatim
    assert!(zone.records.iter().any(|r| r.name == "@"));
    assert!(zone.records.iter().any(|r| r.name == "ipv6.example.com."));
    assert!(zone.records.iter().any(|r| r.name == "10.example.com."));
}

#[test]
fn test_typed_rdata() {
    let zone = ZoneParser::new()
        .parse_file(Path::new("tests/zone_files/example.com.zone"))
        .expect("Failed to read example.com.zone");

    let mx_values: Vec<&RecordData> = zone
        .records
        .iter()
        .filter(|r| r.rtype == RecordType::Mx)
        .map(|r| &r.data)
        .collect();
    assert_eq!(
        mx_values[0],
        &RecordData::Mx {
            preference: 10,
            exchange: "mail.example.com.".to_string()
        }
    );
    assert_eq!(
        mx_values[1],
        &RecordData::Mx {
            preference: 20,
            exchange: "mail2.example.com.".to_string()
        }
    );

    let srv = zone
        .records
        .iter()
        .find(|r| r.rtype == RecordType::Srv)
        .expect("SRV record missing");
    assert_eq!(
        srv.data,
        RecordData::Srv {
            priority: 10,
            weight: 60,
            port: 5060,
            target: "sip.example.com.".to_string()
        }
    );

    let txt = zone
        .records
        .iter()
        .find(|r| r.rtype == RecordType::Txt)
        .expect("TXT record missing");
    assert_eq!(txt.data, RecordData::Plain("v=spf1 mx -all".to_string()));

    // CNAME rdata is taken verbatim, relative target included
    let cname = zone
        .records
        .iter()
        .find(|r| r.rtype == RecordType::Cname)
        .expect("CNAME record missing");
    assert_eq!(cname.data, RecordData::Plain("www".to_string()));
}
