//! Esquema Diesel. Reemplazable con `diesel print-schema`.

diesel::table! {
    generation_requests (id) {
        id -> Uuid,
        identifier -> Text,
        kind -> Text,
        status -> Text,
        result -> Nullable<Text>,
        reason -> Nullable<Text>,
        config -> Nullable<Jsonb>,
        creation_time -> Timestamptz,
    }
}
