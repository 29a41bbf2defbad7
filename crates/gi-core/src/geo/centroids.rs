/// Representative point for placing a country's bubble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub cc: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

const fn c(cc: &'static str, name: &'static str, lat: f64, lon: f64) -> Centroid {
    Centroid { cc, name, lat, lon }
}

pub const CENTROIDS: &[Centroid] = &[
    // Americas
    c("US", "United States", 39.8, -98.6),
    c("CA", "Canada", 56.1, -106.3),
    c("MX", "Mexico", 23.6, -102.5),
    c("BR", "Brazil", -14.2, -51.9),
    c("AR", "Argentina", -38.4, -63.6),
    c("CL", "Chile", -35.7, -71.5),
    c("CO", "Colombia", 4.6, -74.3),
    // Europe
    c("GB", "United Kingdom", 55.4, -3.4),
    c("IE", "Ireland", 53.4, -8.2),
    c("FR", "France", 46.2, 2.2),
    c("DE", "Germany", 51.2, 10.5),
    c("ES", "Spain", 40.5, -3.7),
    c("PT", "Portugal", 39.4, -8.2),
    c("IT", "Italy", 41.9, 12.6),
    c("NL", "Netherlands", 52.1, 5.3),
    c("BE", "Belgium", 50.5, 4.5),
    c("CH", "Switzerland", 46.8, 8.2),
    c("SE", "Sweden", 60.1, 18.6),
    c("NO", "Norway", 60.5, 8.5),
    c("PL", "Poland", 51.9, 19.1),
    c("UA", "Ukraine", 48.4, 31.2),
    c("RU", "Russia", 61.5, 105.3),
    c("TR", "Turkey", 38.9, 35.2),
    // Asia-Pacific
    c("IN", "India", 20.6, 79.0),
    c("PK", "Pakistan", 30.4, 69.3),
    c("CN", "China", 35.9, 104.2),
    c("JP", "Japan", 36.2, 138.3),
    c("KR", "South Korea", 35.9, 127.8),
    c("ID", "Indonesia", -0.8, 113.9),
    c("PH", "Philippines", 12.9, 121.8),
    c("AU", "Australia", -25.3, 133.8),
    c("NZ", "New Zealand", -40.9, 174.9),
    // Africa
    c("ZA", "South Africa", -30.6, 22.9),
    c("NG", "Nigeria", 9.1, 8.7),
    c("EG", "Egypt", 26.8, 30.8),
];

/// Centroid for an ISO-2 code, case-insensitive.
#[must_use]
pub fn centroid(cc: &str) -> Option<&'static Centroid> {
    CENTROIDS.iter().find(|c| c.cc.eq_ignore_ascii_case(cc))
}
