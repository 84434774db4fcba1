// SPDX-License-Identifier: MIT

//! Signal providers — narrow read-only sources of visitor facts
//!
//! Each provider supplies exactly one fact: the current date/time, the
//! requester's IP address, the geographic location resolved for an IP, or
//! the set of content nodes the visitor has viewed. Every call that can
//! legitimately have "no answer" returns an `Option` or an empty set rather
//! than failing; "could not be located" and "has viewed nothing" are
//! expected states the criteria branch on explicitly.

mod clock;
mod geolocation;
mod ip;
mod pages_viewed;

pub use clock::{Clock, FixedClock, SystemClock};
pub use geolocation::{Country, GeoLocationProvider, Region, WebGeoLocationProvider};
pub use ip::{IpProvider, StaticIpProvider};
pub use pages_viewed::{PagesViewedProvider, StaticPagesViewedProvider};
