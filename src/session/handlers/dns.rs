//! DNS response handler
//!
//! Feeds the reverse-lookup cache: every resolved address maps back to the
//! name that was queried for it. Streams themselves are not touched.

use tracing::trace;

use crate::core::packet::PacketView;
use crate::session::Environment;

pub(crate) fn process(env: &mut Environment, pkt: &dyn PacketView) {
    let answers = pkt.dns_answers();
    if answers.is_empty() {
        // query, nothing resolved yet
        return;
    }
    let query = match pkt.dns_query() {
        Some(query) => query.to_string(),
        None => return,
    };

    for addr in answers {
        trace!(%addr, host = %query, "reverse-lookup cache update");
        env.registry.record_host(*addr, &query);
    }
}
