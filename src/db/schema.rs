//! Schema DDL, transcribed from `DvbDb::m_schema` / `DvbDb::m_tables` in
//! `original_source/sistorage/src/dvbdb.cpp`.
//!
//! Two parallel table families: the wire-shaped side (`Nit`, `NitDescriptor`, `NitTransport`,
//! `NitTransportDescriptor`, `Sdt`, `SdtDescriptor`, `Eit`, `EitDescriptor`, `Bat`,
//! `BatDescriptor`, `BatTransport`, `BatTransportDescriptor`) and the parsed projection
//! (`Bouquet`, `Network`, `Transport`, `Service`, `ServiceComponent`, `Event`, `EventComponent`,
//! `EventItem`). `ScanSettings` is created lazily by `load_settings`, matching the original.

/// `CREATE TABLE IF NOT EXISTS` / `CREATE UNIQUE INDEX IF NOT EXISTS` statements, in
/// creation order (parents before children).
pub const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS Nit (
        nit_pk INTEGER PRIMARY KEY NOT NULL,
        network_id INTEGER NOT NULL,
        version INTEGER NOT NULL);",
    "CREATE TABLE IF NOT EXISTS NitDescriptor (
        fkey INTEGER NOT NULL,
        descriptor_id INTEGER NOT NULL,
        descriptor BLOB NOT NULL,
        FOREIGN KEY (fkey) REFERENCES Nit (nit_pk));",
    "CREATE UNIQUE INDEX IF NOT EXISTS NitDescriptor_index ON NitDescriptor (
        fkey, descriptor_id, descriptor);",
    "CREATE TABLE IF NOT EXISTS NitTransport (
        nit_transport_pk INTEGER PRIMARY KEY NOT NULL,
        original_network_id INTEGER NOT NULL,
        transport_id INTEGER NOT NULL,
        nit_fk INTEGER NOT NULL,
        FOREIGN KEY (nit_fk) REFERENCES Nit (network_id));",
    "CREATE UNIQUE INDEX IF NOT EXISTS NitTransport_index ON NitTransport (
        original_network_id, transport_id, nit_fk);",
    "CREATE TABLE IF NOT EXISTS NitTransportDescriptor (
        fkey INTEGER NOT NULL,
        descriptor_id INTEGER NOT NULL,
        descriptor BLOB NOT NULL,
        FOREIGN KEY (fkey) REFERENCES NitTransport (nit_transport_pk));",
    "CREATE UNIQUE INDEX IF NOT EXISTS NitTransportDescriptor_index ON NitTransportDescriptor (
        fkey, descriptor_id, descriptor);",
    "CREATE TABLE IF NOT EXISTS Sdt (
        sdt_pk INTEGER PRIMARY KEY NOT NULL,
        service_id INTEGER NOT NULL,
        nit_transport_fk INTEGER,
        version INTEGER NOT NULL,
        schedule INTEGER NOT NULL,
        present_following INTEGER NOT NULL,
        scrambled INTEGER NOT NULL,
        running INTEGER NOT NULL,
        FOREIGN KEY (nit_transport_fk) REFERENCES NitTransport (nit_transport_pk));",
    "CREATE UNIQUE INDEX IF NOT EXISTS Sdt_index ON Sdt (service_id, nit_transport_fk);",
    "CREATE TABLE IF NOT EXISTS SdtDescriptor (
        fkey INTEGER NOT NULL,
        descriptor_id INTEGER NOT NULL,
        descriptor BLOB NOT NULL,
        FOREIGN KEY (fkey) REFERENCES Sdt (sdt_pk));",
    "CREATE UNIQUE INDEX IF NOT EXISTS SdtDescriptor_index ON SdtDescriptor (
        fkey, descriptor_id, descriptor);",
    "CREATE TABLE IF NOT EXISTS Eit (
        eit_pk INTEGER PRIMARY KEY NOT NULL,
        network_id INTEGER NOT NULL,
        transport_id INTEGER NOT NULL,
        service_id INTEGER NOT NULL,
        event_id INTEGER NOT NULL,
        version INTEGER NOT NULL,
        start_time INTEGER NOT NULL,
        duration INTEGER NOT NULL,
        scrambled INTEGER NOT NULL,
        running INTEGER NOT NULL);",
    "CREATE UNIQUE INDEX IF NOT EXISTS Eit_index ON Eit (
        network_id, transport_id, service_id, event_id);",
    "CREATE TABLE IF NOT EXISTS EitDescriptor (
        fkey INTEGER NOT NULL,
        descriptor_id INTEGER NOT NULL,
        descriptor BLOB NOT NULL,
        FOREIGN KEY (fkey) REFERENCES Eit (eit_pk));",
    "CREATE UNIQUE INDEX IF NOT EXISTS EitDescriptor_index ON EitDescriptor (
        fkey, descriptor_id, descriptor);",
    "CREATE TABLE IF NOT EXISTS Bat (
        bat_pk INTEGER PRIMARY KEY NOT NULL,
        bouquet_id INTEGER NOT NULL,
        version INTEGER NOT NULL);",
    "CREATE TABLE IF NOT EXISTS BatDescriptor (
        fkey INTEGER NOT NULL,
        descriptor_id INTEGER NOT NULL,
        descriptor BLOB NOT NULL,
        FOREIGN KEY (fkey) REFERENCES Bat (bat_pk));",
    "CREATE UNIQUE INDEX IF NOT EXISTS BatDescriptor_index ON BatDescriptor (
        fkey, descriptor_id, descriptor);",
    "CREATE TABLE IF NOT EXISTS BatTransport (
        bat_transport_pk INTEGER PRIMARY KEY NOT NULL,
        original_network_id INTEGER NOT NULL,
        transport_id INTEGER NOT NULL,
        bat_fk INTEGER NOT NULL,
        nit_transport_fk INTEGER,
        FOREIGN KEY (nit_transport_fk) REFERENCES NitTransport (nit_transport_pk),
        FOREIGN KEY (bat_fk) REFERENCES Bat (bat_pk));",
    "CREATE UNIQUE INDEX IF NOT EXISTS BatTransport_index ON BatTransport (
        original_network_id, transport_id, bat_fk);",
    "CREATE TABLE IF NOT EXISTS BatTransportDescriptor (
        fkey INTEGER NOT NULL,
        descriptor_id INTEGER NOT NULL,
        descriptor BLOB NOT NULL,
        FOREIGN KEY (fkey) REFERENCES BatTransport (bat_transport_pk));",
    "CREATE UNIQUE INDEX IF NOT EXISTS BatTransportDescriptor_index ON BatTransportDescriptor (
        fkey, descriptor_id, descriptor);",
    "CREATE TABLE IF NOT EXISTS Bouquet (
        bouquet_pk INTEGER PRIMARY KEY NOT NULL,
        bouquet_id INTEGER NOT NULL,
        version INTEGER NOT NULL,
        iso_639_language_code TEXT,
        name TEXT);",
    "CREATE UNIQUE INDEX IF NOT EXISTS Bouquet_index ON Bouquet (bouquet_id);",
    "CREATE TABLE IF NOT EXISTS Network (
        network_pk INTEGER PRIMARY KEY NOT NULL,
        network_id INTEGER NOT NULL,
        version INTEGER NOT NULL,
        iso_639_language_code TEXT,
        name TEXT);",
    "CREATE UNIQUE INDEX IF NOT EXISTS Network_index ON Network (network_id);",
    "CREATE TABLE IF NOT EXISTS Transport (
        transport_pk INTEGER PRIMARY KEY NOT NULL,
        original_network_id INTEGER NOT NULL,
        transport_id INTEGER NOT NULL,
        network_fk INTEGER NOT NULL,
        bouquet_fk INTEGER,
        frequency INTEGER NOT NULL,
        modulation INTEGER NOT NULL,
        symbol_rate INTEGER NOT NULL,
        fec_outer INTEGER NOT NULL,
        fec_inner INTEGER NOT NULL,
        FOREIGN KEY (network_fk) REFERENCES Network (network_pk),
        FOREIGN KEY (bouquet_fk) REFERENCES Bouquet (bouquet_pk));",
    "CREATE UNIQUE INDEX IF NOT EXISTS Transport_index ON Transport (
        original_network_id, transport_id, network_fk);",
    "CREATE TABLE IF NOT EXISTS Service (
        service_pk INTEGER PRIMARY KEY NOT NULL,
        service_id INTEGER NOT NULL,
        transport_fk INTEGER,
        version INTEGER NOT NULL,
        service_type INTEGER NOT NULL,
        logical_channel_number INTEGER,
        running INTEGER NOT NULL,
        scrambled INTEGER NOT NULL,
        schedule INTEGER NOT NULL,
        present_following INTEGER NOT NULL,
        iso_639_language_code TEXT,
        service_name TEXT,
        provider_name TEXT,
        FOREIGN KEY (transport_fk) REFERENCES Transport (transport_pk));",
    "CREATE UNIQUE INDEX IF NOT EXISTS Service_index ON Service (service_id, transport_fk);",
    "CREATE TABLE IF NOT EXISTS ServiceComponent (
        fkey INTEGER NOT NULL,
        stream_content INTEGER NOT NULL,
        component_type INTEGER NOT NULL,
        component_tag INTEGER NOT NULL,
        iso_639_language_code TEXT,
        description TEXT,
        FOREIGN KEY (fkey) REFERENCES Service (service_pk));",
    "CREATE UNIQUE INDEX IF NOT EXISTS ServiceComponent_index ON ServiceComponent (
        fkey, stream_content, component_type, component_tag);",
    "CREATE TABLE IF NOT EXISTS Event (
        event_pk INTEGER PRIMARY KEY NOT NULL,
        network_id INTEGER NOT NULL,
        transport_id INTEGER NOT NULL,
        service_id INTEGER NOT NULL,
        event_id INTEGER NOT NULL,
        version INTEGER NOT NULL,
        start_time INTEGER NOT NULL,
        duration INTEGER NOT NULL,
        scrambled INTEGER NOT NULL,
        running INTEGER NOT NULL,
        parental_rating TEXT,
        content TEXT);",
    "CREATE UNIQUE INDEX IF NOT EXISTS Event_index ON Event (
        network_id, transport_id, service_id, event_id);",
    "CREATE TABLE IF NOT EXISTS EventComponent (
        fkey INTEGER NOT NULL,
        stream_content INTEGER NOT NULL,
        component_type INTEGER NOT NULL,
        component_tag INTEGER NOT NULL,
        iso_639_language_code TEXT,
        description TEXT,
        FOREIGN KEY (fkey) REFERENCES Event (event_pk));",
    "CREATE UNIQUE INDEX IF NOT EXISTS EventComponent_index ON EventComponent (
        fkey, stream_content, component_type, component_tag);",
    "CREATE TABLE IF NOT EXISTS EventItem (
        event_fk INTEGER NOT NULL,
        iso_639_language_code TEXT,
        title TEXT,
        description TEXT,
        FOREIGN KEY (event_fk) REFERENCES Event (event_pk));",
    "CREATE UNIQUE INDEX IF NOT EXISTS EventItem_index ON EventItem (
        event_fk, iso_639_language_code);",
];

/// Leaf-to-root drop order, so foreign key constraints never fire mid-drop.
pub const TABLES: &[&str] = &[
    "NitDescriptor",
    "NitTransportDescriptor",
    "NitTransport",
    "Nit",
    "SdtDescriptor",
    "Sdt",
    "EitDescriptor",
    "Eit",
    "BatDescriptor",
    "BatTransportDescriptor",
    "BatTransport",
    "Bat",
    "ServiceComponent",
    "Service",
    "EventComponent",
    "EventItem",
    "Event",
    "Transport",
    "Bouquet",
    "Network",
];
