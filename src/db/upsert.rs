//! Version-guarded upserts, grounded on the sequence described by `DvbDb::insertDescriptor` /
//! `insertComponent` plus the table-specific insert paths implied by `original_source/sistorage`'s
//! schema in `dvbdb.cpp`. Each `upsert_*` follows the same shape: look up `(pk, version)` by
//! natural key, skip on a version match, insert on absence, and on a version change either drop
//! the whole schema (`Nit`) or delete-then-reinsert the parent row (`Bat`/`Sdt`/`Eit`).

use rusqlite::{params, Connection, OptionalExtension};

use crate::descriptor::{
    self, CableDeliverySystem, Component, Content, Descriptor, ExtendedEvent, NetworkName,
    ParentalRating, ServiceDescriptor, ShortEvent,
};
use crate::table::{Bat, Eit, Nit, Sdt};

use super::audit::drop_and_recreate_schema;
use super::repair::RepairQueue;

fn find_descriptor<'a>(descs: &'a [Descriptor<'static>], tag: u8) -> Option<&'a Descriptor<'static>> {
    descs.iter().find(|d| d.tag == tag)
}

fn find_all_descriptors<'a>(descs: &'a [Descriptor<'static>], tag: u8) -> Vec<&'a Descriptor<'static>> {
    descs.iter().filter(|d| d.tag == tag).collect()
}

fn lang_to_string(lang: &[u8; 3]) -> String {
    std::str::from_utf8(lang)
        .map(str::to_string)
        .unwrap_or_else(|_| String::from_utf8_lossy(lang).into_owned())
}

/// `(nibble1, nibble2, user_byte)` per entry, parenthesised and concatenated, mirroring the shape
/// of `content` the original accumulates from a Content descriptor.
fn format_content(content: &Content) -> Option<String> {
    if content.entries.is_empty() {
        return None;
    }
    Some(
        content
            .entries
            .iter()
            .map(|e| format!("({}{}{})", e.nibble1, e.nibble2, e.user_byte))
            .collect(),
    )
}

/// `(country_code rating)` per entry, parenthesised and concatenated.
fn format_parental_rating(rating: &ParentalRating) -> Option<String> {
    if rating.entries.is_empty() {
        return None;
    }
    Some(
        rating
            .entries
            .iter()
            .map(|e| format!("({} {})", lang_to_string(&e.country_code), e.rating))
            .collect(),
    )
}

fn insert_descriptors(
    conn: &Connection,
    table: &str,
    fkey: i64,
    descriptors: &[Descriptor<'static>],
) -> anyhow::Result<()> {
    let sql = format!(
        "INSERT OR IGNORE INTO {table} (fkey, descriptor_id, descriptor) VALUES (?1, ?2, ?3)"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    for d in descriptors {
        stmt.execute(params![fkey, i64::from(d.tag), d.data.as_ref()])?;
    }
    Ok(())
}

/// `Nit`: a version change drops and recreates the *entire* schema, per §4.7.2 ("NIT carries
/// network-wide topology; a version bump implies a major topology change").
pub fn upsert_nit(conn: &Connection, nit: &Nit) -> anyhow::Result<()> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT version FROM Nit WHERE network_id = ?1",
            params![i64::from(nit.network_id)],
            |row| row.get(0),
        )
        .optional()?;

    match existing {
        Some(v) if v == i64::from(nit.header.version) => return Ok(()),
        Some(_) => drop_and_recreate_schema(conn)?,
        None => {}
    }

    conn.execute(
        "INSERT INTO Nit (network_id, version) VALUES (?1, ?2)",
        params![i64::from(nit.network_id), i64::from(nit.header.version)],
    )?;
    let nit_pk = conn.last_insert_rowid();
    insert_descriptors(conn, "NitDescriptor", nit_pk, &nit.descriptors)?;

    let network_name = find_descriptor(&nit.descriptors, descriptor::tag::NETWORK_NAME)
        .and_then(|d| NetworkName::decode(d).ok())
        .map(|n| n.name);
    upsert_network(conn, nit.network_id, nit.header.version, network_name.as_deref())?;
    let network_pk = conn.query_row(
        "SELECT network_pk FROM Network WHERE network_id = ?1",
        params![i64::from(nit.network_id)],
        |row| row.get::<_, i64>(0),
    )?;

    for stream in &nit.streams {
        conn.execute(
            "INSERT OR IGNORE INTO NitTransport (original_network_id, transport_id, nit_fk)
             VALUES (?1, ?2, ?3)",
            params![
                i64::from(stream.original_network_id),
                i64::from(stream.ts_id),
                i64::from(nit.network_id)
            ],
        )?;
        let transport_pk: i64 = conn.query_row(
            "SELECT nit_transport_pk FROM NitTransport
             WHERE original_network_id = ?1 AND transport_id = ?2 AND nit_fk = ?3",
            params![
                i64::from(stream.original_network_id),
                i64::from(stream.ts_id),
                i64::from(nit.network_id)
            ],
            |row| row.get(0),
        )?;
        insert_descriptors(
            conn,
            "NitTransportDescriptor",
            transport_pk,
            &stream.descriptors,
        )?;

        let cable = find_descriptor(&stream.descriptors, descriptor::tag::CABLE_DELIVERY_SYSTEM)
            .and_then(|d| CableDeliverySystem::decode(d).ok());
        if let Some(cable) = cable {
            conn.execute(
                "INSERT OR IGNORE INTO Transport
                 (original_network_id, transport_id, network_fk, frequency, modulation, symbol_rate, fec_outer, fec_inner)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    i64::from(stream.original_network_id),
                    i64::from(stream.ts_id),
                    network_pk,
                    i64::from(cable.frequency),
                    i64::from(cable.modulation.to_wire()),
                    i64::from(cable.symbol_rate),
                    i64::from(cable.fec_outer),
                    i64::from(cable.fec_inner)
                ],
            )?;
        }
    }
    Ok(())
}

fn upsert_network(
    conn: &Connection,
    network_id: u16,
    version: u8,
    name: Option<&str>,
) -> anyhow::Result<()> {
    let changed = conn.execute(
        "UPDATE Network SET version = ?2, name = ?3 WHERE network_id = ?1",
        params![i64::from(network_id), i64::from(version), name],
    )?;
    if changed == 0 {
        conn.execute(
            "INSERT INTO Network (network_id, version, name) VALUES (?1, ?2, ?3)",
            params![i64::from(network_id), i64::from(version), name],
        )?;
    }
    Ok(())
}

/// `Bat`: a version change deletes the parent row (cascading orphan descriptors/transports via
/// select-based clean-up on the next audit tick) and reinserts. Transports already present in
/// `Transport` get their `bouquet_fk` patched immediately; transports not yet seen are queued on
/// `repair` so a later audit tick retries once the NIT-derived `Transport` row exists.
pub fn upsert_bat(conn: &Connection, bat: &Bat, repair: &mut RepairQueue) -> anyhow::Result<()> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT version FROM Bat WHERE bouquet_id = ?1",
            params![i64::from(bat.bouquet_id)],
            |row| row.get(0),
        )
        .optional()?;

    match existing {
        Some(v) if v == i64::from(bat.header.version) => return Ok(()),
        Some(_) => {
            conn.execute(
                "DELETE FROM Bat WHERE bouquet_id = ?1",
                params![i64::from(bat.bouquet_id)],
            )?;
        }
        None => {}
    }

    conn.execute(
        "INSERT INTO Bat (bouquet_id, version) VALUES (?1, ?2)",
        params![i64::from(bat.bouquet_id), i64::from(bat.header.version)],
    )?;
    let bat_pk = conn.last_insert_rowid();
    insert_descriptors(conn, "BatDescriptor", bat_pk, &bat.descriptors)?;

    let bouquet_name = find_descriptor(&bat.descriptors, descriptor::tag::BOUQUET_NAME)
        .and_then(|d| descriptor::BouquetName::decode(d).ok())
        .map(|n| n.name);
    let bouquet_changed = conn.execute(
        "UPDATE Bouquet SET version = ?2, name = ?3 WHERE bouquet_id = ?1",
        params![i64::from(bat.bouquet_id), i64::from(bat.header.version), bouquet_name],
    )?;
    if bouquet_changed == 0 {
        conn.execute(
            "INSERT INTO Bouquet (bouquet_id, version, name) VALUES (?1, ?2, ?3)",
            params![i64::from(bat.bouquet_id), i64::from(bat.header.version), bouquet_name],
        )?;
    }

    for stream in &bat.streams {
        let nit_transport_fk: Option<i64> = conn
            .query_row(
                "SELECT nit_transport_pk FROM NitTransport
                 WHERE original_network_id = ?1 AND transport_id = ?2",
                params![
                    i64::from(stream.original_network_id),
                    i64::from(stream.ts_id)
                ],
                |row| row.get(0),
            )
            .optional()?;

        conn.execute(
            "INSERT OR IGNORE INTO BatTransport
             (original_network_id, transport_id, bat_fk, nit_transport_fk)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                i64::from(stream.original_network_id),
                i64::from(stream.ts_id),
                bat_pk,
                nit_transport_fk
            ],
        )?;
        let bat_transport_pk: i64 = conn.query_row(
            "SELECT bat_transport_pk FROM BatTransport
             WHERE original_network_id = ?1 AND transport_id = ?2 AND bat_fk = ?3",
            params![
                i64::from(stream.original_network_id),
                i64::from(stream.ts_id),
                bat_pk
            ],
            |row| row.get(0),
        )?;
        insert_descriptors(
            conn,
            "BatTransportDescriptor",
            bat_transport_pk,
            &stream.descriptors,
        )?;

        let patch = format!(
            "UPDATE Transport SET bouquet_fk = (SELECT bouquet_pk FROM Bouquet WHERE bouquet_id = {})
             WHERE original_network_id = {} AND transport_id = {}",
            bat.bouquet_id, stream.original_network_id, stream.ts_id
        );
        let changed = conn.execute(&patch, [])?;
        if changed == 0 {
            repair.push(patch);
        }
    }
    Ok(())
}

/// `Sdt`: one row per service, keyed by `(service_id, nit_transport_fk)`. A version change
/// deletes and reinserts that single service's row rather than the whole sub-table.
pub fn upsert_sdt(conn: &Connection, sdt: &Sdt) -> anyhow::Result<()> {
    let nit_transport_fk: Option<i64> = conn
        .query_row(
            "SELECT nit_transport_pk FROM NitTransport
             WHERE original_network_id = ?1 AND transport_id = ?2",
            params![
                i64::from(sdt.original_network_id),
                i64::from(sdt.transport_stream_id)
            ],
            |row| row.get(0),
        )
        .optional()?;

    for service in &sdt.services {
        let existing: Option<i64> = conn
            .query_row(
                "SELECT version FROM Sdt WHERE service_id = ?1 AND nit_transport_fk IS ?2",
                params![i64::from(service.service_id), nit_transport_fk],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(v) if v == i64::from(sdt.header.version) => continue,
            Some(_) => {
                conn.execute(
                    "DELETE FROM Sdt WHERE service_id = ?1 AND nit_transport_fk IS ?2",
                    params![i64::from(service.service_id), nit_transport_fk],
                )?;
            }
            None => {}
        }

        conn.execute(
            "INSERT INTO Sdt
             (service_id, nit_transport_fk, version, schedule, present_following, scrambled, running)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                i64::from(service.service_id),
                nit_transport_fk,
                i64::from(sdt.header.version),
                service.eit_schedule_flag,
                service.eit_pf_flag,
                service.scrambled(),
                i64::from(service.running_status)
            ],
        )?;
        let sdt_pk = conn.last_insert_rowid();
        insert_descriptors(conn, "SdtDescriptor", sdt_pk, &service.descriptors)?;

        let transport_fk: Option<i64> = conn
            .query_row(
                "SELECT transport_pk FROM Transport WHERE original_network_id = ?1 AND transport_id = ?2",
                params![
                    i64::from(sdt.original_network_id),
                    i64::from(sdt.transport_stream_id)
                ],
                |row| row.get(0),
            )
            .optional()?;
        let decoded = find_descriptor(&service.descriptors, descriptor::tag::SERVICE)
            .and_then(|d| ServiceDescriptor::decode(d).ok());
        let changed = conn.execute(
            "UPDATE Service SET version = ?3, service_type = ?4, running = ?5, scrambled = ?6,
                schedule = ?7, present_following = ?8, service_name = ?9, provider_name = ?10
             WHERE service_id = ?1 AND transport_fk IS ?2",
            params![
                i64::from(service.service_id),
                transport_fk,
                i64::from(sdt.header.version),
                decoded.as_ref().map(|d| i64::from(d.service_type)).unwrap_or(0),
                i64::from(service.running_status),
                service.scrambled(),
                service.eit_schedule_flag,
                service.eit_pf_flag,
                decoded.as_ref().map(|d| d.service_name.as_str()),
                decoded.as_ref().map(|d| d.provider_name.as_str())
            ],
        )?;
        if changed == 0 {
            conn.execute(
                "INSERT INTO Service
                 (service_id, transport_fk, version, service_type, running, scrambled,
                  schedule, present_following, service_name, provider_name)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    i64::from(service.service_id),
                    transport_fk,
                    i64::from(sdt.header.version),
                    decoded.as_ref().map(|d| i64::from(d.service_type)).unwrap_or(0),
                    i64::from(service.running_status),
                    service.scrambled(),
                    service.eit_schedule_flag,
                    service.eit_pf_flag,
                    decoded.as_ref().map(|d| d.service_name.as_str()),
                    decoded.as_ref().map(|d| d.provider_name.as_str())
                ],
            )?;
        }
    }
    Ok(())
}

/// `Eit`: one row per event, keyed by `(network_id, transport_id, service_id, event_id)`.
pub fn upsert_eit(conn: &Connection, eit: &Eit) -> anyhow::Result<()> {
    for event in &eit.events {
        let existing: Option<i64> = conn
            .query_row(
                "SELECT version FROM Eit
                 WHERE network_id = ?1 AND transport_id = ?2 AND service_id = ?3 AND event_id = ?4",
                params![
                    i64::from(eit.network_id),
                    i64::from(eit.transport_stream_id),
                    i64::from(eit.service_id),
                    i64::from(event.event_id)
                ],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(v) if v == i64::from(eit.header.version) => continue,
            Some(_) => {
                conn.execute(
                    "DELETE FROM Eit
                     WHERE network_id = ?1 AND transport_id = ?2 AND service_id = ?3 AND event_id = ?4",
                    params![
                        i64::from(eit.network_id),
                        i64::from(eit.transport_stream_id),
                        i64::from(eit.service_id),
                        i64::from(event.event_id)
                    ],
                )?;
            }
            None => {}
        }

        let start_time = crate::bcd::mjd_to_unix_time(event.start_time_mjd_bcd);
        let duration = crate::bcd::bcd_duration_seconds(event.duration_bcd);

        conn.execute(
            "INSERT INTO Eit
             (network_id, transport_id, service_id, event_id, version, start_time, duration, scrambled, running)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                i64::from(eit.network_id),
                i64::from(eit.transport_stream_id),
                i64::from(eit.service_id),
                i64::from(event.event_id),
                i64::from(eit.header.version),
                start_time,
                duration,
                event.scrambled(),
                i64::from(event.running_status)
            ],
        )?;
        let eit_pk = conn.last_insert_rowid();
        insert_descriptors(conn, "EitDescriptor", eit_pk, &event.descriptors)?;

        // Parsed projection: the wire-mirror Eit row above was just (re)inserted, so the natural
        // key's prior Event row, if any, is stale too.
        conn.execute(
            "DELETE FROM Event WHERE network_id = ?1 AND transport_id = ?2 AND service_id = ?3 AND event_id = ?4",
            params![
                i64::from(eit.network_id),
                i64::from(eit.transport_stream_id),
                i64::from(eit.service_id),
                i64::from(event.event_id)
            ],
        )?;

        let parental_rating = find_descriptor(&event.descriptors, descriptor::tag::PARENTAL_RATING)
            .and_then(|d| ParentalRating::decode(d).ok())
            .and_then(|pr| format_parental_rating(&pr));
        let content = find_descriptor(&event.descriptors, descriptor::tag::CONTENT)
            .and_then(|d| Content::decode(d).ok())
            .and_then(|c| format_content(&c));

        conn.execute(
            "INSERT INTO Event
             (network_id, transport_id, service_id, event_id, version, start_time, duration, scrambled, running, parental_rating, content)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                i64::from(eit.network_id),
                i64::from(eit.transport_stream_id),
                i64::from(eit.service_id),
                i64::from(event.event_id),
                i64::from(eit.header.version),
                start_time,
                duration,
                event.scrambled(),
                i64::from(event.running_status),
                parental_rating,
                content
            ],
        )?;
        let event_pk = conn.last_insert_rowid();

        for component_desc in find_all_descriptors(&event.descriptors, descriptor::tag::COMPONENT) {
            if let Ok(c) = Component::decode(component_desc) {
                conn.execute(
                    "INSERT OR IGNORE INTO EventComponent
                     (fkey, stream_content, component_type, component_tag, iso_639_language_code, description)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        event_pk,
                        i64::from(c.stream_content),
                        i64::from(c.component_type),
                        i64::from(c.component_tag),
                        lang_to_string(&c.lang),
                        c.text
                    ],
                )?;
            }
        }

        let short_event = find_descriptor(&event.descriptors, descriptor::tag::SHORT_EVENT)
            .and_then(|d| ShortEvent::decode(d).ok());
        let extended_event = find_descriptor(&event.descriptors, descriptor::tag::EXTENDED_EVENT)
            .and_then(|d| ExtendedEvent::decode(d).ok());

        let item = short_event
            .map(|se| (lang_to_string(&se.lang), Some(se.event_name), Some(se.text)))
            .or_else(|| extended_event.map(|ee| (lang_to_string(&ee.lang), None, Some(ee.text))));

        if let Some((lang, title, description)) = item {
            conn.execute(
                "INSERT OR IGNORE INTO EventItem (event_fk, iso_639_language_code, title, description)
                 VALUES (?1, ?2, ?3, ?4)",
                params![event_pk, lang, title, description],
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Event, TableHeader};
    use std::borrow::Cow;

    fn eit_with_event(version: u8, event_id: u16, descriptors: Vec<Descriptor<'static>>) -> Eit {
        Eit {
            header: TableHeader {
                table_id: crate::table::table_id::EIT_PF,
                extension_id: 0x10,
                version,
                current: true,
            },
            service_id: 0x10,
            transport_stream_id: 0x100,
            network_id: 0x200,
            last_table_id: crate::table::table_id::EIT_PF,
            events: vec![Event {
                event_id,
                start_time_mjd_bcd: 0xD91E000000,
                duration_bcd: 0x010000,
                running_status: 4,
                free_ca_mode: false,
                nvod: false,
                descriptors,
            }],
        }
    }

    #[test]
    fn upsert_eit_populates_parsed_event_projection() {
        let conn = Connection::open_in_memory().unwrap();
        super::schema_create(&conn).unwrap();

        let short_event = Descriptor {
            tag: descriptor::tag::SHORT_EVENT,
            data: Cow::Owned(vec![b'e', b'n', b'g', 4, b'N', b'a', b'm', b'e', 3, b'T', b'x', b't']),
        };
        let component = Descriptor {
            tag: descriptor::tag::COMPONENT,
            data: Cow::Owned(vec![0x01, 0x02, 0x03, b'e', b'n', b'g']),
        };
        let eit = eit_with_event(0, 1, vec![short_event, component]);
        upsert_eit(&conn, &eit).unwrap();

        let (title, description): (String, String) = conn
            .query_row(
                "SELECT title, description FROM EventItem",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(title, "Name");
        assert_eq!(description, "Txt");

        let component_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM EventComponent", [], |row| row.get(0))
            .unwrap();
        assert_eq!(component_count, 1);

        let event_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM Event", [], |row| row.get(0))
            .unwrap();
        assert_eq!(event_count, 1);
    }

    #[test]
    fn upsert_eit_version_change_replaces_event_row() {
        let conn = Connection::open_in_memory().unwrap();
        super::schema_create(&conn).unwrap();

        upsert_eit(&conn, &eit_with_event(0, 1, Vec::new())).unwrap();
        upsert_eit(&conn, &eit_with_event(1, 1, Vec::new())).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM Event", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
        let version: i64 = conn
            .query_row("SELECT version FROM Event", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }
}
