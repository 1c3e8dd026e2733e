//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Accounts that can sign in and act on the workflow.
    users (id) {
        id -> Int8,
        name -> Text,
        email -> Text,
        /// One of `admin`, `officer`, `viewer`.
        role -> Text,
        active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Contract pursuits.
    contracts (id) {
        id -> Int8,
        number -> Text,
        title -> Text,
        agency -> Nullable<Text>,
        naics -> Nullable<Text>,
        set_aside -> Nullable<Text>,
        description -> Nullable<Text>,
        status -> Text,
        officer_id -> Nullable<Int8>,
        due_date -> Nullable<Date>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Work items under a contract. `contract_id` has no foreign key.
    tasks (id) {
        id -> Int8,
        contract_id -> Int8,
        description -> Text,
        status -> Text,
        assigned_to -> Nullable<Int8>,
        due_date -> Nullable<Date>,
        completed_at -> Nullable<Timestamptz>,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only mutation history.
    audit_log (id) {
        id -> Int8,
        at -> Timestamptz,
        user_id -> Nullable<Int8>,
        actor -> Text,
        action -> Text,
        entity -> Text,
        entity_id -> Int8,
        before -> Nullable<Jsonb>,
        after -> Nullable<Jsonb>,
    }
}

diesel::joinable!(contracts -> users (officer_id));
diesel::joinable!(audit_log -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, contracts, tasks, audit_log);
