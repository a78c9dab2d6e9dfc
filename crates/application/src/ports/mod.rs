mod dns_prober;

pub use dns_prober::DnsProber;
