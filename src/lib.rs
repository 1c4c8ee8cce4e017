/*!
# PRP Branch Dashboard Core

The persistence and permission core of a single-tenant restaurant-branch
dashboard (the "PRP" system): a fixed set of named users, tabular operational
sheets, dashboard cards, theme settings, shared and collaborative notes, and
an append-only audit trail.

## Overview

All durable state is one JSON document behind a storage abstraction; there is
no server and no network protocol. A session-scoped record holds the
authenticated user. Each browser-tab-equivalent owns one `Store` and mutates
it synchronously; tabs observe each other only through a change bus that
replays the latest committed write wholesale (last writer wins).

## Architecture

- **Document** — the full application aggregate plus `reconcile`, the pure
  startup merge of persisted state against the compiled-in seed catalogs.
- **Seed catalogs** — the initial users, six operational sheets (20 blank
  rows each), seven dashboard cards, theme and shared notes. Passwords live
  only here; they are stripped before every durable write and re-attached on
  load.
- **Storage** — one keyed record, written whole. A file-backed implementation
  for durable state and an in-memory one for session-scoped state and tests.
- **Store** — the active session, the permission evaluator and every named
  mutation. Permission checks are enforced at this API boundary: the four
  ranked levels `read_only < data_entry < editor < admin` gate data entry,
  column additions and user administration, while an orthogonal "customizer"
  capability gates cards, theme and shared notes.
- **Change bus** — the cross-tab notification channel. Receivers replace
  their document with the freshly parsed remote payload; no merging.

## Mutations

Every operation validates the session, mutates the document, appends exactly
one audit entry (newest first) and persists the whole document. Unknown ids
and out-of-bounds cell coordinates are forgiving no-ops that leave the audit
log untouched.

## Out of scope

Routing, rendering, modal dialogs, icons, the login form and localization —
this crate is the layer beneath all of that.
*/

pub mod document;
pub mod seed;
pub mod sheet;
pub mod storage;
pub mod store;
pub mod sync;

pub use document::*;
pub use seed::*;
pub use sheet::*;
pub use storage::*;
pub use store::*;
pub use sync::*;
