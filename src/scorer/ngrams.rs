use crate::alphabet::AlphabetCodec;
use fnv::FnvHashMap;

/// Probability assigned to quadgrams missing from the table.
pub const DEFAULT_QUADGRAM_FLOOR: f64 = 1e-10;

/// Total quadgram count of the reference corpus the embedded counts come from.
const ENGLISH_CORPUS_TOTAL: f64 = 4_224_127_912.0;

/// Most frequent English quadgrams with their corpus counts.
const ENGLISH_QUADGRAMS: &[(&str, f64)] = &[
    ("TION", 13_168_375.0),
    ("NTHE", 11_234_972.0),
    ("THER", 10_218_035.0),
    ("THAT", 8_980_536.0),
    ("OFTH", 8_132_597.0),
    ("FTHE", 8_100_836.0),
    ("THES", 7_717_675.0),
    ("WITH", 7_627_991.0),
    ("INTH", 7_261_789.0),
    ("ATIO", 7_104_943.0),
    ("OTHE", 6_900_965.0),
    ("TTHE", 6_804_436.0),
    ("DTHE", 6_659_463.0),
    ("INGT", 6_575_564.0),
    ("ETHE", 6_539_461.0),
    ("SAND", 6_269_637.0),
    ("STHE", 6_208_963.0),
    ("HERE", 6_143_512.0),
    ("THEC", 5_867_853.0),
    ("MENT", 5_738_862.0),
    ("THEM", 5_712_735.0),
    ("RTHE", 5_695_617.0),
    ("THEP", 5_523_730.0),
    ("FROM", 5_301_318.0),
    ("THIS", 5_179_806.0),
    ("TING", 5_151_802.0),
    ("THEI", 5_007_620.0),
    ("NGTH", 4_991_346.0),
    ("IONS", 4_957_620.0),
    ("ANDT", 4_910_268.0),
    ("EDTH", 4_596_017.0),
    ("ESTH", 4_484_537.0),
    ("ANDS", 4_223_467.0),
    ("ATTH", 4_203_006.0),
    ("ETOT", 4_115_473.0),
    ("HATT", 4_082_530.0),
    ("ENTH", 4_043_217.0),
    ("EAND", 3_935_458.0),
    ("THEA", 3_917_405.0),
    ("ECTI", 3_844_122.0),
    ("FORT", 3_776_372.0),
    ("THEW", 3_749_860.0),
    ("ERTH", 3_687_434.0),
    ("OTHA", 3_512_601.0),
    ("HAVE", 3_494_128.0),
    ("OUGH", 3_457_822.0),
    ("NDTH", 3_424_003.0),
    ("THEY", 3_402_745.0),
    ("ALTH", 3_359_174.0),
    ("TOTH", 3_346_310.0),
    ("INGA", 3_292_210.0),
    ("ANCE", 3_264_470.0),
    ("EREA", 3_198_311.0),
    ("ONTH", 3_170_620.0),
    ("ATTA", 2_871_402.0),
    ("TTAC", 2_410_117.0),
    ("TACK", 2_390_045.0),
    ("REQU", 2_295_774.0),
    ("QUIR", 1_890_355.0),
    ("DAWN", 1_140_572.0),
];

/// Quadgram counts keyed by text, independent of any alphabet.
#[derive(Debug, Clone, Default)]
pub struct QuadgramTable {
    pub entries: Vec<(String, f64)>,
    pub total: f64,
}

impl QuadgramTable {
    pub fn english() -> Self {
        Self {
            entries: ENGLISH_QUADGRAMS
                .iter()
                .map(|&(q, c)| (q.to_string(), c))
                .collect(),
            total: ENGLISH_CORPUS_TOTAL,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Log10 probabilities resolved to alphabet positions.
#[derive(Debug, Clone)]
pub struct QuadgramModel {
    logs: FnvHashMap<[usize; 4], f64>,
    floor: f64,
}

impl QuadgramModel {
    pub fn new(table: &QuadgramTable, codec: &AlphabetCodec, floor_prob: f64) -> Self {
        let mut logs = FnvHashMap::default();
        if table.total > 0.0 {
            for (gram, count) in &table.entries {
                let pos: Vec<usize> = gram.chars().filter_map(|c| codec.position_of(c)).collect();
                if pos.len() != 4 || gram.chars().count() != 4 || *count <= 0.0 {
                    continue;
                }
                let key = [pos[0], pos[1], pos[2], pos[3]];
                *logs.entry(key).or_insert(0.0) += count;
            }
            for v in logs.values_mut() {
                *v = (*v / table.total).log10();
            }
        }
        Self {
            logs,
            floor: floor_prob.log10(),
        }
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    pub fn floor_log(&self) -> f64 {
        self.floor
    }

    /// Sum of log10 probabilities over every overlapping 4-window.
    pub fn log_likelihood(&self, symbols: &[usize]) -> Option<f64> {
        if symbols.len() < 4 {
            return None;
        }
        Some(
            symbols
                .windows(4)
                .map(|w| {
                    self.logs
                        .get(&[w[0], w[1], w[2], w[3]])
                        .copied()
                        .unwrap_or(self.floor)
                })
                .sum(),
        )
    }

    /// Average per-window log likelihood mapped onto `[0, 1]`, where the
    /// floor maps to 0.
    pub fn normalized(&self, symbols: &[usize]) -> Option<f64> {
        let ll = self.log_likelihood(symbols)?;
        if self.floor >= 0.0 {
            return None;
        }
        let windows = (symbols.len() - 3) as f64;
        let avg = ll / windows;
        Some(((avg - self.floor) / -self.floor).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_quadgram_beats_floor() {
        let codec = AlphabetCodec::build(crate::scorer::profiles::LATIN).unwrap();
        let model = QuadgramModel::new(&QuadgramTable::english(), &codec, DEFAULT_QUADGRAM_FLOOR);
        let tion = model.log_likelihood(&codec.encode("TION")).unwrap();
        let junk = model.log_likelihood(&codec.encode("QZXJ")).unwrap();
        assert!(tion > junk);
        assert!((junk - (-10.0)).abs() < 1e-9);
        assert_eq!(model.log_likelihood(&codec.encode("THE")), None);
    }
}
