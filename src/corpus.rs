//! Built-in demo corpus and questions.

pub const DOCUMENTS: &[&str] = &[
    "C++ is a powerful programming language.",
    "The cat is on the roof.",
    "Artificial intelligence is transforming the world.",
    "The quick brown fox jumps over the lazy dog.",
    "David Espejo is the most experienced fullstack developer who rarely leaves home.",
    "RAG stands for Retrieval-Augmented Generation.",
    "RAG uses a vector database to store and retrieve relevant information based on user queries.",
    "Ricardo Valle is an expert in low level programming and system design.",
    "RAG uses an LLM to generate responses based on retrieved information and user input.",
    "Alicia has stinky feet but is the only one who knows Power BI.",
    "Corporate knowledge article database are often bloated.",
    "Alejandro Rodriguez is a known Mariachi singer in Mexico.",
    "Corporate knowledge articles are often tagged incorrectly and hard to find.",
];

/// Asked when no questions are passed on the command line.
pub const DEFAULT_QUERIES: &[&str] = &[
    "What is RAG and why is it useful in corporate?",
    "Who are the members of my team and what are they known for?",
];
