// Ad hoc TF-IDF similarity between a resume and a free-text job description.

pub mod matcher;
pub mod tfidf;
