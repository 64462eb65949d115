//! Diesel table definitions mirroring `backend/migrations`.

diesel::table! {
    /// Registered accounts. `username` carries the `users_username_key`
    /// unique constraint.
    users (id) {
        /// Primary key assigned by `BIGSERIAL`.
        id -> Int8,
        /// Unique login name (max 32 characters).
        username -> Varchar,
        /// Optional contact address.
        email -> Nullable<Varchar>,
        /// Argon2id PHC string.
        password_hash -> Text,
        /// `USER` or `ADMIN`.
        role -> Varchar,
        /// Public URL of the uploaded avatar.
        avatar_url -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}
