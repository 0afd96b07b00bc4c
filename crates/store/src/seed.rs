//! Default document written into an empty knowledge base

/// Name of the seed document
pub const DEFAULT_FILE_NAME: &str = "my_knowledge.txt";

/// Content of the seed document
pub const DEFAULT_CONTENT: &str = "\
# Sample Knowledge Base

## About This Assistant
This is an AI-powered knowledge assistant that answers questions based on
your custom knowledge base of plain-text files.

## Features
- Knowledge base management (add, show, remove files)
- Chat history export as JSON
- Answers grounded in your documents, powered by Google Gemini

## How to Use
1. Add your knowledge files (plain .txt documents)
2. Ask questions in the chat
3. The assistant answers based on your files and cites the source
4. Export the chat history when needed
";
