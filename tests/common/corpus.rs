//! Review corpora for integration tests

use kanoscope::RawComment;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// A named set of reviews
#[derive(Debug, Clone)]
pub struct ReviewCorpus {
    pub name: String,
    pub comments: Vec<RawComment>,
}

impl ReviewCorpus {
    pub fn from_texts(name: &str, texts: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            comments: texts
                .iter()
                .enumerate()
                .map(|(i, text)| RawComment::new(format!("{}-{}", name, i), *text).with_source(name))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }
}

/// Phone reviews mixing Chinese and English, praise and complaints,
/// one exact duplicate and two comments too short to keep.
pub fn mixed_corpus() -> ReviewCorpus {
    ReviewCorpus::from_texts(
        "phone",
        &[
            "电池很差，一天要充三次电",
            "电池太差了，非常失望",
            "续航很差，出门必须带充电宝",
            "屏幕非常好，显示效果惊艳",
            "这个东西又贵又卡，但是设计很漂亮。",
            "The camera is amazing. Battery life is terrible though",
            "希望增加夜景拍照模式",
            "物流很快，包装完好",
            "价格有点贵，不过还可以接受",
            "电池很差，一天要充三次电",
            "好",
            "ok",
            "Customer service was useless and slow to reply",
            "The screen is great but the battery is bad.",
            "系统更新后变得很卡，非常后悔",
            "音质不错，扬声器声音很大",
            "收到了，谢谢卖家",
        ],
    )
}

/// Write comments as a plain-text file, one per line.
pub fn write_text(dir: &TempDir, corpus: &ReviewCorpus) -> PathBuf {
    let path = dir.path().join(format!("{}.txt", corpus.name));
    let mut file = std::fs::File::create(&path).expect("create text corpus");
    for comment in &corpus.comments {
        writeln!(file, "{}", comment.text).expect("write text corpus");
    }
    path
}

/// Write comments as a JSON array of records.
pub fn write_json(dir: &TempDir, corpus: &ReviewCorpus) -> PathBuf {
    let path = dir.path().join(format!("{}.json", corpus.name));
    let json = serde_json::to_string_pretty(&corpus.comments).expect("serialize corpus");
    std::fs::write(&path, json).expect("write json corpus");
    path
}
